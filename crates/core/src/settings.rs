//! Settings collaborator contract and filename templating.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;

use crate::converter::ConversionOptions;

/// Placeholder replaced with the file (or batch) name.
pub const NAME_PLACEHOLDER: &str = "%name%";
/// Placeholder replaced with the current ISO-8601 timestamp.
pub const DATE_PLACEHOLDER: &str = "%date%";
/// Placeholder replaced with the output extension; empty for batches.
pub const EXTENSION_PLACEHOLDER: &str = "%extension%";

/// Name substituted for `%name%` when formatting a batch archive name.
pub const BATCH_NAME: &str = "Multi";

/// Supplies user-configurable knobs to the orchestration core.
///
/// Read at convert/download time, never cached by the core. Persistence
/// is the caller's concern.
pub trait SettingsProvider: Send + Sync {
    /// Filename template applied to downloads (e.g. `"MORPHIX_%name%"`).
    fn filename_format(&self) -> String;

    /// Backend-specific conversion knobs, passed through opaquely.
    fn conversion_options(&self) -> ConversionOptions;

    /// Whether the user has acknowledged the external-upload warning.
    fn external_upload_acknowledged(&self) -> bool;

    /// Records the external-upload acknowledgment.
    fn set_external_upload_acknowledged(&self, accepted: bool);
}

/// Applies the filename template with an explicit timestamp.
pub fn format_filename_at(
    template: &str,
    name: &str,
    extension: &str,
    date: &DateTime<Utc>,
) -> String {
    template
        .replace(DATE_PLACEHOLDER, &date.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace(NAME_PLACEHOLDER, name)
        .replace(EXTENSION_PLACEHOLDER, extension)
}

/// Applies the filename template at the current time.
pub fn format_filename(template: &str, name: &str, extension: &str) -> String {
    format_filename_at(template, name, extension, &Utc::now())
}

#[derive(Debug, Clone)]
struct SettingsState {
    filename_format: String,
    options: ConversionOptions,
    external_upload_acknowledged: bool,
}

/// Process-local settings, used by tests and as the CLI's base store.
#[derive(Debug)]
pub struct InMemorySettings {
    state: RwLock<SettingsState>,
}

impl InMemorySettings {
    pub fn new(filename_format: impl Into<String>, options: ConversionOptions) -> Self {
        Self {
            state: RwLock::new(SettingsState {
                filename_format: filename_format.into(),
                options,
                external_upload_acknowledged: false,
            }),
        }
    }

    /// Pre-sets the acknowledgment flag, e.g. when restored from disk.
    pub fn with_external_upload_acknowledged(self, accepted: bool) -> Self {
        self.state.write().external_upload_acknowledged = accepted;
        self
    }
}

impl Default for InMemorySettings {
    fn default() -> Self {
        Self::new("MORPHIX_%name%", ConversionOptions::default())
    }
}

impl SettingsProvider for InMemorySettings {
    fn filename_format(&self) -> String {
        self.state.read().filename_format.clone()
    }

    fn conversion_options(&self) -> ConversionOptions {
        self.state.read().options.clone()
    }

    fn external_upload_acknowledged(&self) -> bool {
        self.state.read().external_upload_acknowledged
    }

    fn set_external_upload_acknowledged(&self, accepted: bool) {
        self.state.write().external_upload_acknowledged = accepted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_filename_replaces_all_placeholders() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let formatted = format_filename_at("%date%_%name%%extension%", "song", ".ogg", &date);
        assert_eq!(formatted, "2024-06-01T12:30:00Z_song.ogg");
    }

    #[test]
    fn test_format_filename_batch_values() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let formatted = format_filename_at("MORPHIX_%name%%extension%", BATCH_NAME, "", &date);
        assert_eq!(formatted, "MORPHIX_Multi");
    }

    #[test]
    fn test_template_without_placeholders_is_untouched() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(format_filename_at("plain", "x", ".y", &date), "plain");
    }

    #[test]
    fn test_in_memory_acknowledgment_round_trip() {
        let settings = InMemorySettings::default();
        assert!(!settings.external_upload_acknowledged());
        settings.set_external_upload_acknowledged(true);
        assert!(settings.external_upload_acknowledged());
    }
}
