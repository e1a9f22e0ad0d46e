//! Format support declarations for converters.

use thiserror::Error;

/// Errors raised while declaring format support.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A format must be usable in at least one direction.
    #[error("format '{name}' must support at least one direction")]
    NoDirection { name: String },
}

/// One supported extension for one converter.
///
/// The name is normalized to a single leading-dot extension string
/// (`"mp3"` and `".mp3"` both become `".mp3"`). Immutable after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    name: String,
    from_supported: bool,
    to_supported: bool,
    is_native: bool,
}

impl FormatInfo {
    /// Declares a supported format with explicit direction flags.
    ///
    /// Fails when neither direction is supported.
    pub fn new(
        name: &str,
        from_supported: bool,
        to_supported: bool,
        is_native: bool,
    ) -> Result<Self, FormatError> {
        let name = normalize(name);

        if !from_supported && !to_supported {
            return Err(FormatError::NoDirection { name });
        }

        Ok(Self {
            name,
            from_supported,
            to_supported,
            is_native,
        })
    }

    /// A format supported in both directions without re-encoding.
    pub fn native(name: &str) -> Self {
        Self {
            name: normalize(name),
            from_supported: true,
            to_supported: true,
            is_native: true,
        }
    }

    /// A format handled in both directions, but only through an
    /// intermediate re-encoding step.
    pub fn non_native(name: &str) -> Self {
        Self {
            name: normalize(name),
            from_supported: true,
            to_supported: true,
            is_native: false,
        }
    }

    /// A format accepted as input only.
    pub fn from_only(name: &str, is_native: bool) -> Self {
        Self {
            name: normalize(name),
            from_supported: true,
            to_supported: false,
            is_native,
        }
    }

    /// The normalized extension string, including the leading dot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether files of this format are accepted as input.
    pub fn from_supported(&self) -> bool {
        self.from_supported
    }

    /// Whether files of this format can be produced as output.
    pub fn to_supported(&self) -> bool {
        self.to_supported
    }

    /// Whether the converter handles this format without an intermediate
    /// re-encoding step.
    pub fn is_native(&self) -> bool {
        self.is_native
    }
}

fn normalize(name: &str) -> String {
    format!(".{}", name.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_gets_leading_dot() {
        let format = FormatInfo::native("mp3");
        assert_eq!(format.name(), ".mp3");
    }

    #[test]
    fn test_existing_dot_is_not_doubled() {
        let format = FormatInfo::native(".mp3");
        assert_eq!(format.name(), ".mp3");
    }

    #[test]
    fn test_repeated_dots_collapse() {
        let format = FormatInfo::native("..mp3");
        assert_eq!(format.name(), ".mp3");
    }

    #[test]
    fn test_no_direction_fails() {
        let result = FormatInfo::new("wav", false, false, true);
        assert!(matches!(result, Err(FormatError::NoDirection { .. })));
    }

    #[test]
    fn test_any_single_direction_succeeds() {
        let from_only = FormatInfo::new("mkv", true, false, false).unwrap();
        assert!(from_only.from_supported());
        assert!(!from_only.to_supported());

        let to_only = FormatInfo::new("mkv", false, true, false).unwrap();
        assert!(!to_only.from_supported());
        assert!(to_only.to_supported());

        let both = FormatInfo::new("mkv", true, true, true).unwrap();
        assert!(both.from_supported());
        assert!(both.to_supported());
    }

    #[test]
    fn test_convenience_constructors() {
        assert!(FormatInfo::native("flac").is_native());
        assert!(!FormatInfo::non_native("gif").is_native());

        let input_only = FormatInfo::from_only("avi", false);
        assert!(input_only.from_supported());
        assert!(!input_only.to_supported());
    }
}
