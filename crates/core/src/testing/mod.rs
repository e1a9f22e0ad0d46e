//! Testing utilities and mock implementations.
//!
//! Provides a controllable [`MockConverter`] so orchestration behavior can
//! be exercised without real codec backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use morphix_core::testing::MockConverter;
//!
//! let converter = MockConverter::new("mock-audio")
//!     .with_native_formats(&["mp3", "wav"]);
//!
//! // Inject a failure for the next conversion
//! converter.fail_next(ConverterError::conversion_failed("boom", None));
//!
//! // Inspect what was converted
//! assert_eq!(converter.conversion_count(), 1);
//! ```

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};
