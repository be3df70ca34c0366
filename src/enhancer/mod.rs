// SPDX-License-Identifier: MIT
//! Post-processing transforms for freshly generated HTML/CSS/JS.
//!
//! The enhancer always strips history-API calls (they break inside the
//! sandboxed preview iframe) and, behind per-feature toggles, injects
//! accessibility and responsive boilerplate.  Every injection is gated on
//! the feature being verifiably absent from the input, which makes the
//! whole pass idempotent: re-running on already-enhanced output applies
//! nothing.
//!
//! Pure string transforms, no I/O.  Construct one [`CodeEnhancer`] per
//! call site; the applied-enhancement list is scoped to each
//! [`CodeEnhancer::enhance`] invocation, so a shared instance would be
//! safe too — but there is deliberately no module-level singleton.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Regex constants ──────────────────────────────────────────────────────────

/// Whole lines invoking the history API or assigning `location.hash`.
static RE_HISTORY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^.*(?:history\.(?:pushState|replaceState)\s*\(|location\.hash\s*=).*\n?")
        .expect("history line regex")
});

/// `<input …>` tags carrying an `id` attribute.
static RE_INPUT_WITH_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<input\b[^>]*\bid="([^"]+)"[^>]*>"#).expect("input id regex"));

/// Hex color literals (`#fff`, `#a1b2c3`).
static RE_HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("hex color regex"));

// ─── Public types ─────────────────────────────────────────────────────────────

/// Per-feature toggles.  Everything defaults to on; the history-API strip
/// is unconditional and has no toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnhancementOptions {
    pub inject_labels: bool,
    pub aria_roles: bool,
    pub extract_color_variables: bool,
    pub focus_styles: bool,
    pub responsive_breakpoints: bool,
    pub reduced_motion: bool,
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            inject_labels: true,
            aria_roles: true,
            extract_color_variables: true,
            focus_styles: true,
            responsive_breakpoints: true,
            reduced_motion: true,
        }
    }
}

/// Transformed code plus human-readable descriptions of what was applied.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedCode {
    pub html: String,
    pub css: String,
    pub js: String,
    pub enhancements: Vec<String>,
}

pub struct CodeEnhancer {
    options: EnhancementOptions,
}

impl CodeEnhancer {
    pub fn new(options: EnhancementOptions) -> Self {
        Self { options }
    }

    /// Run the full enhancement pass.
    pub fn enhance(&self, html: &str, css: &str, js: &str) -> EnhancedCode {
        let mut applied: Vec<String> = Vec::new();

        let js = strip_history_calls(js, &mut applied);

        let mut html = html.to_owned();
        if self.options.inject_labels {
            html = inject_labels(&html, &mut applied);
        }
        if self.options.aria_roles {
            html = inject_aria_roles(&html, &mut applied);
        }

        // CSS injections only extend a stylesheet the generator actually
        // produced; an empty css input stays empty.
        let mut css = css.to_owned();
        if !css.is_empty() {
            if self.options.extract_color_variables {
                css = extract_color_variables(&css, &mut applied);
            }
            if self.options.focus_styles && !css.contains(":focus") {
                css.push_str(FOCUS_RULES);
                applied.push("Added :focus-visible outlines for keyboard navigation".to_owned());
            }
            if self.options.responsive_breakpoints && !css.contains("@media") {
                css.push_str(RESPONSIVE_RULES);
                applied.push("Added responsive breakpoint media queries".to_owned());
            }
            if self.options.reduced_motion && !css.contains("prefers-reduced-motion") {
                css.push_str(REDUCED_MOTION_RULES);
                applied.push("Added prefers-reduced-motion support".to_owned());
            }
        }

        EnhancedCode {
            html,
            css,
            js,
            enhancements: applied,
        }
    }
}

// ─── JS transforms ────────────────────────────────────────────────────────────

/// Remove statements that navigate the history stack — inside the preview
/// iframe they throw SecurityErrors or hijack the parent page.
fn strip_history_calls(js: &str, applied: &mut Vec<String>) -> String {
    if !RE_HISTORY_LINE.is_match(js) {
        return js.to_owned();
    }
    applied.push("Removed history API calls that break the sandboxed preview".to_owned());
    RE_HISTORY_LINE.replace_all(js, "").into_owned()
}

// ─── HTML transforms ──────────────────────────────────────────────────────────

/// Insert a `<label>` before every labelable `<input id="…">` that has no
/// matching `<label for="…">`.
fn inject_labels(html: &str, applied: &mut Vec<String>) -> String {
    let mut insertions: Vec<(usize, String)> = Vec::new();
    for caps in RE_INPUT_WITH_ID.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let id = &caps[1];
        let tag = whole.as_str();
        if tag.contains("type=\"hidden\"")
            || tag.contains("type=\"submit\"")
            || tag.contains("type=\"button\"")
        {
            continue;
        }
        if html.contains(&format!("for=\"{id}\"")) {
            continue;
        }
        insertions.push((whole.start(), format!("<label for=\"{id}\">{}</label>\n", humanize(id))));
    }
    if insertions.is_empty() {
        return html.to_owned();
    }
    applied.push(format!("Added labels for {} unlabeled input(s)", insertions.len()));

    let mut out = String::with_capacity(html.len() + 64 * insertions.len());
    let mut cursor = 0;
    for (pos, label) in insertions {
        out.push_str(&html[cursor..pos]);
        out.push_str(&label);
        cursor = pos;
    }
    out.push_str(&html[cursor..]);
    out
}

/// `contact-email` → `Contact email`.
fn humanize(id: &str) -> String {
    let spaced = id.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Add landmark roles to the first occurrence of each landmark element,
/// but only when the document carries no roles at all.
fn inject_aria_roles(html: &str, applied: &mut Vec<String>) -> String {
    if html.contains("role=") {
        return html.to_owned();
    }
    let landmarks = [
        ("<header", "<header role=\"banner\""),
        ("<nav", "<nav role=\"navigation\""),
        ("<main", "<main role=\"main\""),
        ("<footer", "<footer role=\"contentinfo\""),
    ];
    let mut out = html.to_owned();
    let mut added = 0;
    for (from, to) in landmarks {
        if out.contains(from) {
            out = out.replacen(from, to, 1);
            added += 1;
        }
    }
    if added > 0 {
        applied.push(format!("Added ARIA landmark roles to {added} element(s)"));
    }
    out
}

// ─── CSS transforms ───────────────────────────────────────────────────────────

/// How often a color literal must repeat before it is promoted to a
/// custom property.
const COLOR_REPEAT_THRESHOLD: usize = 3;

/// Promote repeated hex colors to `:root` custom properties.  Skipped
/// entirely when the stylesheet already uses custom properties.
fn extract_color_variables(css: &str, applied: &mut Vec<String>) -> String {
    if css.contains("--") {
        return css.to_owned();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for m in RE_HEX_COLOR.find_iter(css) {
        let color = m.as_str().to_lowercase();
        let count = counts.entry(color.clone()).or_insert(0);
        if *count == 0 {
            order.push(color);
        }
        *count += 1;
    }

    let promoted: Vec<(String, String)> = order
        .into_iter()
        .filter(|c| counts[c] >= COLOR_REPEAT_THRESHOLD)
        .enumerate()
        .map(|(i, c)| (c, format!("--color-{}", i + 1)))
        .collect();
    if promoted.is_empty() {
        return css.to_owned();
    }

    let vars: HashMap<&str, &str> = promoted
        .iter()
        .map(|(c, v)| (c.as_str(), v.as_str()))
        .collect();
    let replaced = RE_HEX_COLOR.replace_all(css, |caps: &regex::Captures| {
        let color = caps[0].to_lowercase();
        match vars.get(color.as_str()) {
            Some(var) => format!("var({var})"),
            None => caps[0].to_owned(),
        }
    });

    let mut out = String::from(":root {\n");
    for (color, var) in &promoted {
        out.push_str(&format!("    {var}: {color};\n"));
    }
    out.push_str("}\n\n");
    out.push_str(&replaced);

    applied.push(format!(
        "Extracted {} repeated color(s) into CSS custom properties",
        promoted.len()
    ));
    out
}

const FOCUS_RULES: &str = "\n\n\
a:focus-visible,\n\
button:focus-visible,\n\
input:focus-visible,\n\
select:focus-visible,\n\
textarea:focus-visible {\n\
    outline: 2px solid currentColor;\n\
    outline-offset: 2px;\n\
}\n";

const RESPONSIVE_RULES: &str = "\n\n\
@media (max-width: 768px) {\n\
    body {\n\
        padding: 0 1rem;\n\
    }\n\
}\n\n\
@media (max-width: 480px) {\n\
    h1 {\n\
        font-size: 1.5rem;\n\
    }\n\
}\n";

const REDUCED_MOTION_RULES: &str = "\n\n\
@media (prefers-reduced-motion: reduce) {\n\
    *,\n\
    *::before,\n\
    *::after {\n\
        animation-duration: 0.01ms !important;\n\
        transition-duration: 0.01ms !important;\n\
        scroll-behavior: auto !important;\n\
    }\n\
}\n";

// ─── Tests ────────────────────────────────────────────────────────────────────
