//! User-facing output and prompts.
//!
//! Handlers never write to stdout/stderr directly. They go through
//! [`Console`], which can be backed by the real streams or by memory so
//! tests can compare output byte for byte.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::colors::{ColorMode, Painter};

/// Prefix put in front of every line of an error message.
pub const BANG: &str = " !    ";

enum Sink {
    Stdout,
    Stderr,
    Memory(Vec<u8>),
}

impl Sink {
    fn write_text(&mut self, text: &str) {
        // Output failures (closed pipe) are not actionable for a CLI.
        let _ = match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes()).and_then(|_| out.flush())
            }
            Sink::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(text.as_bytes()).and_then(|_| err.flush())
            }
            Sink::Memory(buf) => buf.write_all(text.as_bytes()),
        };
    }

    fn captured(&self) -> String {
        match self {
            Sink::Memory(buf) => String::from_utf8_lossy(buf).into_owned(),
            _ => String::new(),
        }
    }
}

enum Input {
    Stdin,
    Memory(VecDeque<String>),
}

/// Output and prompt channel shared by all commands.
pub struct Console {
    out: Sink,
    err: Sink,
    input: Input,
    painter: Painter,
}

impl Console {
    /// Console bound to the process streams.
    pub fn stdio(color: ColorMode) -> Self {
        Self {
            out: Sink::Stdout,
            err: Sink::Stderr,
            input: Input::Stdin,
            painter: Painter::new(color),
        }
    }

    /// Console that records output and answers prompts from `answers`.
    pub fn memory<S: AsRef<str>>(answers: &[S]) -> Self {
        Self {
            out: Sink::Memory(Vec::new()),
            err: Sink::Memory(Vec::new()),
            input: Input::Memory(answers.iter().map(|a| a.as_ref().to_string()).collect()),
            painter: Painter::plain(),
        }
    }

    /// Everything written to the output stream (memory consoles only).
    pub fn stdout_text(&self) -> String {
        self.out.captured()
    }

    /// Everything written to the error stream (memory consoles only).
    pub fn stderr_text(&self) -> String {
        self.err.captured()
    }

    // === Output ===

    pub fn display(&mut self, message: &str) {
        self.out.write_text(message);
        self.out.write_text("\n");
    }

    /// Print without a trailing newline (progress dots, prompts).
    pub fn display_inline(&mut self, message: &str) {
        self.out.write_text(message);
    }

    pub fn blank_line(&mut self) {
        self.out.write_text("\n");
    }

    /// `=== Header`
    pub fn styled_header(&mut self, header: &str) {
        let line = self.painter.header(&format!("=== {}", header));
        self.display(&line);
    }

    /// One item per line, sorted, followed by a blank line.
    pub fn styled_array(&mut self, items: &[String]) {
        let mut items = items.to_vec();
        items.sort();
        for item in &items {
            self.display(item.trim_end());
        }
        self.blank_line();
    }

    /// Rows with each column padded to its widest cell, in the given order,
    /// followed by a blank line.
    pub fn styled_rows(&mut self, rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = Vec::new();
        for row in rows {
            for (idx, cell) in row.iter().enumerate() {
                match widths.get_mut(idx) {
                    Some(width) => *width = (*width).max(cell.len()),
                    None => widths.push(cell.len()),
                }
            }
        }
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(idx, cell)| format!("{:<width$}", cell, width = widths[idx]))
                .collect();
            self.display(cells.join("  ").trim_end());
        }
        self.blank_line();
    }

    /// `key: value` lines with values aligned, sorted by key. Empty values are skipped.
    pub fn styled_hash(&mut self, entries: &[(String, String)]) {
        let mut entries: Vec<&(String, String)> =
            entries.iter().filter(|(_, v)| !v.is_empty()).collect();
        if entries.is_empty() {
            return;
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 2;
        for (key, value) in entries {
            let label = format!("{:<width$}", format!("{}: ", key), width = width);
            let line = format!("{}{}", self.painter.key(&label), value);
            self.display(&line);
        }
    }

    /// Error message on the error stream, every line prefixed with [`BANG`].
    pub fn error(&mut self, message: &str) {
        let formatted = format_with_bang(message);
        if formatted.is_empty() {
            return;
        }
        let painted = self.painter.error(&formatted);
        self.err.write_text(&painted);
        self.err.write_text("\n");
    }

    /// Raw text on the error stream.
    pub fn error_raw(&mut self, text: &str) {
        self.err.write_text(text);
    }

    // === Input ===

    /// Read one line of input, trimmed.
    pub fn ask(&mut self) -> io::Result<String> {
        match &mut self.input {
            Input::Stdin => {
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                Ok(line.trim().to_string())
            }
            Input::Memory(answers) => Ok(answers.pop_front().unwrap_or_default().trim().to_string()),
        }
    }

    /// Read one line of input without echoing it when attached to a terminal.
    pub fn ask_secret(&mut self) -> io::Result<String> {
        match &mut self.input {
            Input::Stdin if io::stdin().is_terminal() => {
                let secret = console::Term::stderr().read_secure_line()?;
                Ok(secret.trim().to_string())
            }
            _ => self.ask(),
        }
    }
}

/// Prefix each line of `message` with [`BANG`]. Blank messages format to "".
pub fn format_with_bang(message: &str) -> String {
    if message.trim().is_empty() {
        return String::new();
    }
    message
        .split('\n')
        .map(|line| format!("{}{}", BANG, line))
        .collect::<Vec<_>>()
        .join("\n")
}
