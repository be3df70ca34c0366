// SPDX-License-Identifier: MIT
//! Character-budgeted file embedding.
//!
//! Full file contents must be embedded so the generation service can read
//! and edit real code, but the payload has to stay inside the downstream
//! model's context window.  This module is a greedy budgeter over an
//! ordered file list:
//!
//! 1. Source-like files are processed first, config/lockfiles/markdown
//!    last, so truncation always sacrifices the least valuable content.
//! 2. Each file is emitted whole if it fits the remaining budget, truncated
//!    with an explicit marker if there is meaningful partial room, or
//!    reduced to a path-only stub line otherwise.
//! 3. The running total counts header + body + footer exactly; the output
//!    never exceeds the ceiling.
//!
//! The pass is deterministic and order-preserving (original order within
//! each priority class), which is what lets tests assert exact truncation
//! behavior.  Cost is proportional to total content size, not file count.

use crate::intelligence::IterationContext;
use crate::project::FileInfo;
use crate::prompt::templates::NO_FILES_PLACEHOLDER;

/// Ceiling for the system-prompt file listing.
pub const SYSTEM_LISTING_CEILING: usize = 300_000;
/// Separate, lower ceiling for the user-message variant.
pub const USER_MESSAGE_CEILING: usize = 250_000;

/// Minimum content slice worth emitting; below this a stub is clearer than
/// a few characters of a truncated file.
const MIN_TRUNCATED_BODY: usize = 64;

const TRUNCATION_MARKER: &str = "\n[truncated to fit context window]";

/// Lockfiles, docs, and dotfiles — sacrificed first under budget pressure.
fn is_low_priority(file: &FileInfo) -> bool {
    let name = file.filename.to_lowercase();
    matches!(
        name.as_str(),
        "package-lock.json" | "yarn.lock" | "pnpm-lock.yaml" | "license" | "license.txt"
    ) || name.ends_with(".md")
        || name.ends_with(".txt")
        || name.ends_with(".lock")
        || name.starts_with(".env")
        || name.starts_with('.')
}

/// Return the files reordered so source-like files come first.  Original
/// order is preserved within each class.
fn by_priority(files: &[FileInfo]) -> Vec<&FileInfo> {
    let mut ordered: Vec<&FileInfo> = files.iter().filter(|&f| !is_low_priority(f)).collect();
    ordered.extend(files.iter().filter(|&f| is_low_priority(f)));
    ordered
}

// ─── Block styles ─────────────────────────────────────────────────────────────

/// How one file is framed in the output.  The listing style is used inside
/// the system prompt; the tagged style wraps files appended to the user
/// message.
enum BlockStyle {
    Listing,
    Tagged,
}

impl BlockStyle {
    fn header(&self, file: &FileInfo) -> String {
        match self {
            BlockStyle::Listing => format!("=== FILE: {} ===\n", file.path),
            BlockStyle::Tagged => format!("<file path=\"{}\">\n", file.path),
        }
    }

    fn footer(&self) -> &'static str {
        match self {
            BlockStyle::Listing => "\n\n",
            BlockStyle::Tagged => "\n</file>\n\n",
        }
    }

    fn stub(&self, file: &FileInfo) -> String {
        match self {
            BlockStyle::Listing => {
                format!("=== FILE: {} (omitted to fit context window) ===\n\n", file.path)
            }
            BlockStyle::Tagged => format!("<file path=\"{}\" omitted=\"true\" />\n\n", file.path),
        }
    }
}

/// Append file blocks to `out` without letting `out` grow past `ceiling`.
/// Emits at least one (possibly cut-short) stub line whenever `files` is
/// non-empty, so a degenerate ceiling can never hide every file silently.
fn append_file_blocks(out: &mut String, files: &[FileInfo], ceiling: usize, style: BlockStyle) {
    let ordered = by_priority(files);
    let start = out.len();
    for &file in &ordered {
        let remaining = ceiling.saturating_sub(out.len());
        let header = style.header(file);
        let footer = style.footer();
        let framing = header.len() + footer.len() + TRUNCATION_MARKER.len();

        if header.len() + file.content.len() + footer.len() <= remaining {
            out.push_str(&header);
            out.push_str(&file.content);
            out.push_str(footer);
        } else if framing + MIN_TRUNCATED_BODY <= remaining {
            let body_budget = remaining - framing;
            let cut = floor_char_boundary(&file.content, body_budget);
            out.push_str(&header);
            out.push_str(&file.content[..cut]);
            out.push_str(TRUNCATION_MARKER);
            out.push_str(footer);
        } else {
            let stub = style.stub(file);
            if stub.len() <= remaining {
                out.push_str(&stub);
            }
            // No room even for the stub line: skip, later (shorter-pathed)
            // files may still fit a stub.
        }
    }

    // Ceiling smaller than any stub line: cut the first file's stub to the
    // remaining room rather than emit nothing at all.
    if out.len() == start {
        if let Some(first) = ordered.first().copied() {
            let stub = style.stub(first);
            let cut = floor_char_boundary(&stub, ceiling.saturating_sub(out.len()));
            out.push_str(&stub[..cut]);
        }
    }
}

/// Largest index `<= max` that falls on a UTF-8 character boundary.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut i = max;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ─── Public entry points ──────────────────────────────────────────────────────

/// Format the existing files for embedding in the system prompt.
///
/// Output length is guaranteed `<= ceiling`.  An empty file set yields the
/// literal [`NO_FILES_PLACEHOLDER`].
pub fn format_file_listing(files: &[FileInfo], ceiling: usize) -> String {
    if files.is_empty() {
        return NO_FILES_PLACEHOLDER.to_owned();
    }
    let mut out = String::new();
    append_file_blocks(&mut out, files, ceiling, BlockStyle::Listing);
    out
}

/// Build the augmented user message: the original message followed by each
/// existing file in a tagged block, budgeted to `ceiling` overall.
///
/// Returns the message unchanged when the context is not an iteration or
/// has no files.  Independent of the composer — pure function of its
/// inputs.
pub fn build_user_message_with_context(
    message: &str,
    ctx: &IterationContext,
    ceiling: usize,
) -> String {
    if !ctx.is_iteration || ctx.existing_files.is_empty() {
        return message.to_owned();
    }

    let preamble = "\n\nCurrent project files:\n\n";
    let mut out = String::with_capacity(message.len() + preamble.len());
    out.push_str(message);
    out.push_str(preamble);
    append_file_blocks(&mut out, &ctx.existing_files, ceiling, BlockStyle::Tagged);
    out
}

// ─── Tests ────────────────────────────────────────────────────────────────────
