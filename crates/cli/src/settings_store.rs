//! File-backed settings store.
//!
//! The orchestration core only consumes the [`SettingsProvider`] trait;
//! this store layers one persisted flag — the external-upload
//! acknowledgment — on top of the config-supplied defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use morphix_core::{ConversionOptions, InMemorySettings, SettingsProvider, UserSettings};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    accepted_external_warning: bool,
}

/// Settings provider backed by the config file defaults plus a small
/// per-user state file.
pub struct FileSettings {
    inner: InMemorySettings,
    state_path: Option<PathBuf>,
}

impl FileSettings {
    /// Builds the provider, restoring the persisted acknowledgment flag.
    pub fn load(user: UserSettings) -> Self {
        let state_path = dirs::config_dir().map(|dir| dir.join("morphix").join("state.json"));
        let accepted = state_path
            .as_deref()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| serde_json::from_str::<PersistedState>(&content).ok())
            .map(|state| state.accepted_external_warning)
            .unwrap_or(false);

        let inner = InMemorySettings::new(user.filename_format, user.options)
            .with_external_upload_acknowledged(accepted);

        Self { inner, state_path }
    }

    fn persist(&self, accepted: bool) {
        let Some(ref path) = self.state_path else {
            return;
        };
        let state = PersistedState {
            accepted_external_warning: accepted,
        };
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(&state)?;
            std::fs::write(path, content)
        };
        if let Err(e) = write() {
            warn!(path = %path.display(), error = %e, "failed to persist settings state");
        }
    }
}

impl SettingsProvider for FileSettings {
    fn filename_format(&self) -> String {
        self.inner.filename_format()
    }

    fn conversion_options(&self) -> ConversionOptions {
        self.inner.conversion_options()
    }

    fn external_upload_acknowledged(&self) -> bool {
        self.inner.external_upload_acknowledged()
    }

    fn set_external_upload_acknowledged(&self, accepted: bool) {
        self.inner.set_external_upload_acknowledged(accepted);
        self.persist(accepted);
    }
}
