//! Terminal consent prompt.

use async_trait::async_trait;
use console::{style, Term};

use morphix_core::ConsentPrompt;

/// Yes/no prompt rendered on the user's terminal.
pub struct TermPrompt {
    term: Term,
}

impl TermPrompt {
    pub fn new(term: Term) -> Self {
        Self { term }
    }
}

#[async_trait]
impl ConsentPrompt for TermPrompt {
    async fn confirm(
        &self,
        title: &str,
        message: &str,
        accept_label: &str,
        decline_label: &str,
    ) -> bool {
        let _ = self
            .term
            .write_line(&format!("{}", style(title).bold().yellow()));
        let _ = self.term.write_line(message);
        let _ = self.term.write_str(&format!(
            "{} / {} [y/N]: ",
            style(accept_label).green(),
            style(decline_label).red()
        ));

        match self.term.read_line() {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
