//! Output formatting for CLI.

use console::{style, Term};
use std::io::Write;

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    /// Map `-q` and the number of `-v` flags to a level; quiet wins
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }

    /// Default log filter for this level, used unless RUST_LOG is set
    pub fn log_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
            Verbosity::Debug => "trace",
        }
    }
}

/// Output handler for CLI
pub struct Output {
    term: Term,
    verbosity: Verbosity,
    json_mode: bool,
}

impl Output {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            term: Term::stderr(),
            verbosity,
            json_mode: false,
        }
    }

    /// Enable JSON output mode
    pub fn set_json_mode(&mut self, json: bool) {
        self.json_mode = json;
    }

    fn should_output(&self, min_verbosity: Verbosity) -> bool {
        !self.json_mode && self.verbosity >= min_verbosity
    }

    pub fn writeln(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.term, "{}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.term, "{} {}", style("Info:").cyan(), message);
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.term, "{} {}", style("Success:").green().bold(), message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_output(Verbosity::Quiet) {
            let _ = writeln!(&self.term, "{} {}", style("Warning:").yellow().bold(), message);
        }
    }

    /// Errors are shown in every mode
    pub fn error(&self, message: &str) {
        let _ = writeln!(&self.term, "{} {}", style("Error:").red().bold(), message);
    }

    pub fn verbose(&self, message: &str) {
        if self.should_output(Verbosity::Verbose) {
            let _ = writeln!(&self.term, "{}", style(message).dim());
        }
    }

    pub fn list_item(&self, prefix: &str, message: &str) {
        if self.should_output(Verbosity::Normal) {
            let _ = writeln!(&self.term, "  {} {}", style(prefix).green(), message);
        }
    }

    /// Write JSON to stdout
    pub fn json<T: serde::Serialize>(&self, data: &T) {
        if self.json_mode {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{}", json);
            }
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Progress bars are drawn only when stderr is an interactive terminal
    pub fn wants_progress(&self) -> bool {
        !self.is_quiet() && !self.json_mode && self.term.is_term()
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}
