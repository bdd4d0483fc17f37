//! Human-readable output.
//!
//! Informational text goes to stdout and errors to stderr, both suppressed
//! in silent mode. A capturing sink records lines instead so tests can
//! assert on what would have been printed.

use std::sync::{Arc, Mutex, PoisonError};

use scaffold_types::ScaffoldError;

#[derive(Debug, Clone)]
enum Target {
    Stdio,
    Capture(Arc<Mutex<Vec<String>>>),
}

/// Where the host writes text meant for a person.
#[derive(Debug, Clone)]
pub struct Output {
    silent: bool,
    target: Target,
}

impl Output {
    pub fn stdio(silent: bool) -> Self {
        Self {
            silent,
            target: Target::Stdio,
        }
    }

    /// Record lines in memory. Errors are recorded with an `error: ` prefix.
    pub fn capture(silent: bool) -> Self {
        Self {
            silent,
            target: Target::Capture(Arc::default()),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub(crate) fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Everything recorded so far; empty for stdio output.
    pub fn captured(&self) -> Vec<String> {
        match &self.target {
            Target::Stdio => Vec::new(),
            Target::Capture(lines) => lines.lock().unwrap_or_else(PoisonError::into_inner).clone(),
        }
    }

    pub fn print(&self, text: &str) {
        if self.silent {
            return;
        }
        match &self.target {
            Target::Stdio => println!("{text}"),
            Target::Capture(lines) => lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(text.to_string()),
        }
    }

    pub fn error(&self, err: &ScaffoldError) {
        if self.silent {
            return;
        }
        match &self.target {
            Target::Stdio => eprintln!("{} {err}", console::style("error:").red().bold()),
            Target::Capture(lines) => lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("error: {err}")),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdio(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_records_text_and_errors() {
        let out = Output::capture(false);
        out.print("hello");
        out.error(&ScaffoldError::CommandNotFound("nope".into()));
        assert_eq!(
            out.captured(),
            vec![
                "hello".to_string(),
                "error: unable to find handler for command: nope".to_string()
            ]
        );
    }

    #[test]
    fn silent_suppresses_everything() {
        let out = Output::capture(true);
        out.print("hello");
        out.error(&ScaffoldError::Initializer("x".into()));
        assert!(out.captured().is_empty());
        assert!(out.is_silent());
    }

    #[test]
    fn clones_share_the_capture_buffer() {
        let out = Output::capture(false);
        let loud = out.clone().with_silent(false);
        loud.print("shared");
        assert_eq!(out.captured(), vec!["shared"]);
    }
}
