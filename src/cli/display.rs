//! Terminal rendering of display payloads.

use crate::host::Display;
use crate::models::DisplayPayload;
use std::fmt::Write as _;

/// Display that prints to the terminal.
///
/// Results go to stdout; notices go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    /// Creates a terminal display.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Display for TerminalDisplay {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn show(&self, payload: DisplayPayload) {
        let rendered = render_payload(&payload);
        if matches!(payload, DisplayPayload::Notice(_)) {
            eprintln!("{rendered}");
        } else {
            println!("{rendered}");
        }
    }
}

/// Renders `payload` as plain text.
#[must_use]
pub fn render_payload(payload: &DisplayPayload) -> String {
    match payload {
        DisplayPayload::Text { title, body } => format!("{title}\n\n{body}"),
        DisplayPayload::Associations { title, result } => {
            let mut out = title.clone();
            out.push('\n');
            for entry in result {
                let _ = write!(out, "\n{}: {}", entry.candidate, entry.sentence);
            }
            out
        },
        DisplayPayload::Guess(result) => {
            let verdict = if result.is_match() {
                "correct"
            } else {
                "not quite"
            };
            format!(
                "Guess: {}\nActual: {}\n({verdict})",
                result.guessed, result.actual
            )
        },
        DisplayPayload::Notice(text) => text.clone(),
    }
}
