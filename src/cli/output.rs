//! Colored terminal output for build runs
//!
//! Normal output goes to stdout and respects `--quiet`; errors always go to stderr.

use std::io::{self, Write};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Prints `symbol message` with the symbol in `symbol_color`, optionally
    /// tinting the message too.
    fn tagged(
        &self,
        symbol: &str,
        symbol_color: Color,
        message_color: Option<Color>,
        message: &str,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(symbol_color)).set_bold(true));
        let _ = write!(&mut buffer, "{symbol}");
        let _ = buffer.reset();
        if let Some(color) = message_color {
            let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)));
        }
        let _ = writeln!(&mut buffer, " {message}");
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.tagged("✓", Color::Green, None, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.tagged("⚠", Color::Yellow, Some(Color::Yellow), message)
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.tagged("⋯", Color::Magenta, None, message)
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.tagged("→", Color::Blue, None, message)
    }

    /// Print an error message to stderr (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red))).is_err()
            || writeln!(&mut buffer, " {}", message).is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer);
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = writeln!(&mut buffer, "═══ {} ═══", title);
        let _ = buffer.reset();
        self.bufwtr.print(&buffer)
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.println(&format!("    {message}"))
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        let _ = writeln!(&mut buffer, "{}", message);
        self.bufwtr.print(&buffer)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_suppresses_normal_output() {
        let output = OutputManager::new(false, true);
        assert!(output.is_quiet());
        assert!(output.println("hidden").is_ok());
        assert!(output.success("hidden").is_ok());
    }

    #[test]
    fn test_clone_keeps_flags() {
        let output = OutputManager::new(true, false).clone();
        assert!(output.is_verbose());
        assert!(!output.is_quiet());
    }
}
