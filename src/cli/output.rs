//! Colored terminal output for publish operations
//!
//! Write failures are ignored: output never changes the outcome of a run.

use std::io::Write;
use std::sync::{Arc, Mutex};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Where rendered lines go
#[derive(Debug, Clone)]
enum Sink {
    /// Colored stdout and stderr
    Terminal,
    /// Uncolored in-memory transcript of every stream
    Captured(Arc<Mutex<Vec<u8>>>),
}

/// Output manager for consistent colored terminal output
#[derive(Debug, Clone)]
pub struct OutputManager {
    sink: Sink,
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            sink: Sink::Terminal,
            verbose,
            quiet,
        }
    }

    /// Output manager that records lines in memory instead of printing them
    ///
    /// Clones share the same transcript, read back with [`captured`](Self::captured).
    pub fn capturing(verbose: bool, quiet: bool) -> Self {
        Self {
            sink: Sink::Captured(Arc::new(Mutex::new(Vec::new()))),
            verbose,
            quiet,
        }
    }

    /// Text recorded so far; empty for a terminal sink
    pub fn captured(&self) -> String {
        match &self.sink {
            Sink::Terminal => String::new(),
            Sink::Captured(lines) => match lines.lock() {
                Ok(lines) => String::from_utf8_lossy(&lines).into_owned(),
                Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
            },
        }
    }

    fn buffer(&self, bufwtr: &BufferWriter) -> Buffer {
        match self.sink {
            Sink::Terminal => bufwtr.buffer(),
            Sink::Captured(_) => Buffer::no_color(),
        }
    }

    fn flush(&self, bufwtr: &BufferWriter, buffer: &Buffer) -> std::io::Result<()> {
        match &self.sink {
            Sink::Terminal => bufwtr.print(buffer),
            Sink::Captured(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.extend_from_slice(buffer.as_slice());
                }
                Ok(())
            }
        }
    }

    fn emit(
        &self,
        symbol: &str,
        symbol_spec: Option<ColorSpec>,
        text_spec: Option<ColorSpec>,
        message: &str,
    ) {
        let bufwtr = BufferWriter::stdout(ColorChoice::Auto);
        let mut buffer = self.buffer(&bufwtr);
        let _ = write_line(&mut buffer, symbol, symbol_spec, text_spec, message);
        let _ = self.flush(&bufwtr, &buffer);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.emit(
            "✓",
            Some(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true).clone()),
            None,
            message,
        );
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.emit(
            "⚠",
            Some(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true).clone()),
            Some(ColorSpec::new().set_fg(Some(Color::Yellow)).clone()),
            message,
        );
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = self.buffer(&bufwtr);

        if write_line(
            &mut buffer,
            "✗",
            Some(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true).clone()),
            Some(ColorSpec::new().set_fg(Some(Color::Red)).clone()),
            message,
        )
        .is_err()
            || self.flush(&bufwtr, &buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {}", message);
        }
    }

    /// Print a verbose message (only in verbose mode)
    pub fn verbose(&self, message: &str) {
        if !self.verbose || self.quiet {
            return;
        }
        self.emit(
            "→",
            Some(ColorSpec::new().set_fg(Some(Color::Blue)).clone()),
            None,
            message,
        );
    }

    /// Print a verbose warning (only in verbose mode)
    pub fn verbose_warn(&self, message: &str) {
        if self.verbose {
            self.warn(message);
        }
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.emit("   ", None, None, message);
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.quiet {
            return;
        }
        let bufwtr = BufferWriter::stdout(ColorChoice::Auto);
        let mut buffer = self.buffer(&bufwtr);
        let _ = writeln!(&mut buffer, "{}", message);
        let _ = self.flush(&bufwtr, &buffer);
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

fn write_line(
    buffer: &mut Buffer,
    symbol: &str,
    symbol_spec: Option<ColorSpec>,
    text_spec: Option<ColorSpec>,
    message: &str,
) -> std::io::Result<()> {
    if let Some(spec) = symbol_spec {
        buffer.set_color(&spec)?;
    }
    write!(buffer, "{}", symbol)?;
    buffer.reset()?;
    if let Some(spec) = &text_spec {
        buffer.set_color(spec)?;
    }
    writeln!(buffer, " {}", message)?;
    buffer.reset()
}
