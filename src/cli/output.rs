//! Terminal output for build results.
//!
//! Progress goes through `log`; only the final result is written to stdout so
//! it can be captured by release scripts.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes user-facing lines, colored when the stream is a terminal.
#[derive(Debug, Clone)]
pub struct OutputManager {
    quiet: bool,
}

impl OutputManager {
    /// Creates a manager; `quiet` suppresses success lines.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Result line on stdout, printed even in quiet mode.
    pub fn result(&self, message: &str) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
        write_result(&mut stdout, message)?;
        stdout.flush()
    }

    /// Success line on stderr, suppressed in quiet mode.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
        write_success(&mut stderr, message)
    }

    /// Error with remediation hints on stderr.
    pub fn error(&self, message: &str, suggestions: &[String]) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(color_choice(io::stderr().is_terminal()));
        write_error(&mut stderr, message, suggestions)
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn write_result<W: WriteColor>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{message}")
}

fn write_success<W: WriteColor>(out: &mut W, message: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "✓")?;
    out.reset()?;
    writeln!(out, " {message}")
}

fn write_error<W: WriteColor>(out: &mut W, message: &str, suggestions: &[String]) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "Error:")?;
    out.reset()?;
    writeln!(out, " {message}")?;
    for suggestion in suggestions {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "  →")?;
        out.reset()?;
        writeln!(out, " {suggestion}")?;
    }
    Ok(())
}
