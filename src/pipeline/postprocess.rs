//! Post-processing: deterministic cleanup of raw engine text.
//!
//! OCR engines emit structural noise alongside the recognised text: a
//! trailing form feed as a page terminator, Windows line endings from some
//! trained data files, runs of trailing spaces where the layout analyser
//! padded a line, and occasional stray control characters for glyphs it
//! could not classify. These are artefacts of the engine, not content, so
//! they are stripped here with a handful of cheap deterministic rules
//! rather than leaking into every caller.
//!
//! Rules run in a fixed order: line endings are normalised before any
//! per-line trimming, and the final-whitespace pass runs last so earlier
//! rules cannot reintroduce a ragged tail. Each rule is a pure
//! `&str → String` function, independently testable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw engine output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Drop form feeds (the engine's page terminator)
/// 3. Strip stray control characters the engine emits for unclassifiable glyphs
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Trim leading/trailing blank lines
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_form_feeds(&s);
    let s = remove_control_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim_matches('\n').to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Drop form feeds ──────────────────────────────────────────────

fn remove_form_feeds(input: &str) -> String {
    input.replace('\u{000C}', "")
}

// ── Rule 3: Strip stray control characters ───────────────────────────────

// C0 controls except newline and tab, plus zero-width/invisible codepoints.
static RE_CONTROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0E-\x1F\x7F\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}]").unwrap()
});

fn remove_control_chars(input: &str) -> String {
    RE_CONTROL.replace_all(input, "").into_owned()
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse blank lines ─────────────────────────────────────────

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUNS.replace_all(input, "\n\n\n").into_owned()
}
