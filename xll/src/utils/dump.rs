//! Aligned field listing for header diagnostics.
//!
//! Every line goes to the `debug` log level, one field per line, with the
//! field names padded to a fixed column so nested structures stay readable.

use std::fmt::Display;

use log::debug;

#[cfg(test)]
thread_local! {
    static CAPTURED: std::cell::RefCell<Option<Vec<String>>> = const { std::cell::RefCell::new(None) };
}

/// Runs `f` and returns every line it dumped on this thread.
#[cfg(test)]
pub(crate) fn capture(f: impl FnOnce()) -> Vec<String> {
    CAPTURED.with(|c| c.replace(Some(Vec::new())));
    f();
    CAPTURED.with(|c| c.take()).unwrap_or_default()
}

fn emit(line: String) {
    #[cfg(test)]
    CAPTURED.with(|c| {
        if let Some(lines) = c.borrow_mut().as_mut() {
            lines.push(line.clone());
        }
    });

    debug!("{line}");
}

#[derive(Debug, Clone, Copy)]
pub struct DumpTable {
    pub indent: usize,
    pub width: usize,
}

impl DumpTable {
    pub const fn new(indent: usize, width: usize) -> Self {
        Self { indent, width }
    }

    /// Same column layout, shifted right by `by` spaces.
    pub const fn nested(self, by: usize) -> Self {
        Self {
            indent: self.indent + by,
            width: self.width.saturating_sub(by),
        }
    }

    pub fn line(&self, name: &str, value: impl Display) -> String {
        format!(
            "{:indent$}{:<width$} {value}",
            "",
            format!("{name}:"),
            indent = self.indent,
            width = self.width + 1,
        )
    }

    pub fn field(&self, name: &str, value: impl Display) {
        emit(self.line(name, value));
    }

    pub fn title(&self, title: impl Display) {
        emit(format!("{:indent$}{title}", "", indent = self.indent));
    }
}
