//! Dialog collaborator contract.

use async_trait::async_trait;

/// Asks the user a yes/no question with two labeled actions.
///
/// The core requests a prompt when it first routes a file to an
/// externally-processing converter; its behavior branches on the answer.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Returns `true` when the accept action fired.
    async fn confirm(
        &self,
        title: &str,
        message: &str,
        accept_label: &str,
        decline_label: &str,
    ) -> bool;
}

/// Accepts every prompt without user interaction.
pub struct AutoAccept;

#[async_trait]
impl ConsentPrompt for AutoAccept {
    async fn confirm(&self, _title: &str, _message: &str, _accept: &str, _decline: &str) -> bool {
        true
    }
}

/// Declines every prompt without user interaction.
pub struct AutoDecline;

#[async_trait]
impl ConsentPrompt for AutoDecline {
    async fn confirm(&self, _title: &str, _message: &str, _accept: &str, _decline: &str) -> bool {
        false
    }
}
