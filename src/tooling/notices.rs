//! User-facing notices printed while organizing.

use crate::observer::{OrganizeEvent, OrganizeObserver};
use owo_colors::OwoColorize;
use std::io::{IsTerminal, Write};

/// Prints one notice per failed file or directory, and for a missing root, to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Notice text for an event, `None` when the event is not user-facing.
    pub fn render(&self, event: &OrganizeEvent<'_>) -> Option<String> {
        let (label, message) = match event {
            OrganizeEvent::FileFailed { path, error } => {
                ("failed", format!("could not organize {}: {}", path, error))
            }
            OrganizeEvent::PruneFailed { path, error } => {
                ("failed", format!("could not remove folder {}: {}", path, error))
            }
            OrganizeEvent::RootMissing { path } => {
                ("notice", format!("attachment folder not found: {}", display_root(path)))
            }
            _ => return None,
        };
        let label = match (self.color, event.is_failure()) {
            (false, _) => label.to_string(),
            (true, true) => label.red().bold().to_string(),
            (true, false) => label.yellow().to_string(),
        };
        Some(format!("{}: {}", label, message))
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganizeObserver for ConsoleNotifier {
    fn notify(&self, event: &OrganizeEvent<'_>) {
        if let Some(line) = self.render(event) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

fn display_root(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrganizeError;

    #[test]
    fn test_render_failure_notice() {
        let notifier = ConsoleNotifier::plain();
        let error = OrganizeError::Collision {
            path: "A/ab/x.png".to_string(),
        };
        let line = notifier
            .render(&OrganizeEvent::FileFailed {
                path: "A/x.png",
                error: &error,
            })
            .unwrap();
        assert_eq!(
            line,
            "failed: could not organize A/x.png: Target already occupied by another file: A/ab/x.png"
        );
    }

    #[test]
    fn test_render_skips_routine_events() {
        let notifier = ConsoleNotifier::plain();
        assert!(notifier
            .render(&OrganizeEvent::FileMoved {
                from: "A/x.png",
                to: "A/ab/x.png"
            })
            .is_none());
        assert_eq!(
            notifier
                .render(&OrganizeEvent::RootMissing { path: "" })
                .unwrap(),
            "notice: attachment folder not found: /"
        );
    }
}
