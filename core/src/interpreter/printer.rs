use std::sync::Mutex;

/// Output sink for `Print`, `Read`, `History` and friends.
pub trait Printer: Send + Sync {
    fn print(&self, line: &str);
}

/// Writes every line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&self, line: &str) {
        println!("{}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct BufferPrinter {
    lines: Mutex<Vec<String>>,
}

impl BufferPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut lines) => core::mem::take(&mut *lines),
            Err(poisoned) => core::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Printer for BufferPrinter {
    fn print(&self, line: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(line.to_string());
    }
}
