use std::io::{self, Write};

/// Switchable plain-text output for interactive tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOutput {
    enabled: bool,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ConsoleOutput {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log(&self, msg: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.log_to(&mut out, msg) {
            tracing::warn!("console output failed: {e}");
        }
    }

    pub fn log_to<W: Write>(&self, out: &mut W, msg: &str) -> io::Result<()> {
        if self.enabled {
            write!(out, "  --- {msg}\n\n")?;
        }
        Ok(())
    }
}
