use std::io::{self, BufRead, Write};

use colored::Colorize;
use taskboard_core::Prompt;

use crate::utils::display::{LogBuilder, LogType};

/// Questions on stdin, notices on stdout
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} {} ", message.bold(), "[y/N]".dimmed());
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "couldn't read confirmation");
                false
            }
        }
    }

    fn notify(&self, message: &str) {
        LogBuilder::new(LogType::Success, message).print();
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn assume_yes_skips_the_question() {
        assert!(TerminalPrompt::new(true).confirm("Delete this task?"));
    }
}
