//! Terminal rendering of streamed answers.
//!
//! The backend formats answers for a web page: line breaks arrive as `<br>`
//! and emphasis as `<strong>`.  [`TerminalDisplay`] turns those into newlines
//! and ANSI bold, printing only the newly revealed part of the answer on each
//! progress update.

use std::io::{self, Stdout, Write};

use crate::display::ResponseDisplay;

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Convert the backend's light HTML into terminal text.
///
/// Tags other than `<br>` and `<strong>` are left untouched.
pub fn render_markup(text: &str, use_color: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            out.push_str(tail);
            return out;
        };
        let tag = &tail[..=close];
        match tag.to_ascii_lowercase().as_str() {
            "<br>" | "<br/>" | "<br />" => out.push('\n'),
            "<strong>" | "<b>" => {
                if use_color {
                    out.push_str(ANSI_BOLD);
                }
            }
            "</strong>" | "</b>" => {
                if use_color {
                    out.push_str(ANSI_RESET);
                }
            }
            _ => out.push_str(tag),
        }
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Length of the prefix of `text` that can be rendered without cutting a tag.
fn renderable_prefix(text: &str) -> usize {
    match text.rfind('<') {
        Some(open) if !text[open..].contains('>') => open,
        _ => text.len(),
    }
}

/// A [`ResponseDisplay`] that writes to a terminal.
pub struct TerminalDisplay<W: Write = Stdout> {
    out: W,
    use_color: bool,
    shown: usize,
}

impl TerminalDisplay<Stdout> {
    /// Creates a display on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a display on stdout with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for TerminalDisplay<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            shown: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, raw: &str) {
        let rendered = render_markup(raw, self.use_color);
        let _ = self.out.write_all(rendered.as_bytes());
        let _ = self.out.flush();
    }

    /// Bytes of `text` not yet written.  Starts over if `text` is not a
    /// continuation of what was shown.
    fn unseen<'a>(&mut self, text: &'a str) -> &'a str {
        if self.shown > text.len() || !text.is_char_boundary(self.shown) {
            self.shown = 0;
        }
        &text[self.shown..]
    }

    fn end_line(&mut self) {
        if self.use_color {
            let _ = self.out.write_all(ANSI_RESET.as_bytes());
        }
        let _ = self.out.write_all(b"\n");
        let _ = self.out.flush();
        self.shown = 0;
    }
}

impl<W: Write> ResponseDisplay for TerminalDisplay<W> {
    fn on_progress(&mut self, current_text: &str) {
        let unseen = self.unseen(current_text);
        let ready = &unseen[..renderable_prefix(unseen)];
        if ready.is_empty() {
            return;
        }
        self.shown += ready.len();
        self.emit(ready);
    }

    fn on_success(&mut self, final_text: &str) {
        let unseen = self.unseen(final_text);
        self.emit(unseen);
        self.end_line();
    }

    fn on_error(&mut self, message: &str) {
        let line = if self.use_color {
            format!("\n{ANSI_RED}Error: {message}{ANSI_RESET}")
        } else {
            format!("\nError: {message}")
        };
        let _ = self.out.write_all(line.as_bytes());
        self.end_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TerminalDisplay<Vec<u8>> {
        TerminalDisplay::with_writer(Vec::new(), false)
    }

    fn written(display: TerminalDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn markup_line_breaks() {
        assert_eq!(render_markup("a<br>b<BR/>c<br />d", false), "a\nb\nc\nd");
    }

    #[test]
    fn markup_bold() {
        assert_eq!(render_markup("<strong>hi</strong>", false), "hi");
        assert_eq!(
            render_markup("<strong>hi</strong>", true),
            format!("{ANSI_BOLD}hi{ANSI_RESET}")
        );
    }

    #[test]
    fn markup_leaves_other_tags_and_text() {
        assert_eq!(render_markup("1 < 2 <em>x</em>", false), "1 < 2 <em>x</em>");
    }

    #[test]
    fn prefix_holds_back_open_tag() {
        assert_eq!(renderable_prefix("abc<st"), 3);
        assert_eq!(renderable_prefix("abc<br>"), 7);
        assert_eq!(renderable_prefix("abc"), 3);
    }

    #[test]
    fn progress_prints_only_new_text() {
        let mut display = plain();
        display.on_progress("Hello ");
        display.on_progress("Hello world");
        display.on_success("Hello world!");
        assert_eq!(written(display), "Hello world!\n");
    }

    #[test]
    fn tag_split_across_updates() {
        let mut display = plain();
        display.on_progress("line one<b");
        display.on_progress("line one<br>line two");
        display.on_success("line one<br>line two");
        assert_eq!(written(display), "line one\nline two\n");
    }

    #[test]
    fn error_is_printed() {
        let mut display = plain();
        display.on_progress("partial");
        display.on_error("Connection error: refused");
        assert_eq!(written(display), "partial\nError: Connection error: refused\n");
    }

    #[test]
    fn display_is_reusable_across_answers() {
        let mut display = plain();
        display.on_success("first answer");
        display.on_progress("second");
        display.on_success("second");
        assert_eq!(written(display), "first answer\nsecond\n");
    }

    #[test]
    fn default_has_color() {
        let display = TerminalDisplay::new();
        assert!(display.use_color);
    }
}
