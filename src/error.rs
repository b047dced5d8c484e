//! Error types for parabreak
//!
//! This module provides error types for the two subsystems that can fail:
//! - Locale handling (strict BCP-47 parsing)
//! - Line breaking (unsupported input, hyphenation pattern loading)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and
//! proper error trait implementations.
//!
//! Note that most anomalies in this crate are deliberately NOT errors:
//! lenient locale parsing degrades to `und`, out-of-range hyphenation
//! candidates are dropped, and empty input produces an empty result.

use thiserror::Error;

/// Result type alias for parabreak operations
///
/// This is a convenience type that uses our Error type as the error variant.
///
/// # Examples
///
/// ```
/// use parabreak::Result;
///
/// fn measure_paragraph() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for parabreak
///
/// Each variant wraps a more specific error type for that subsystem.
#[derive(Error, Debug)]
pub enum Error {
  /// Locale parsing error (strict parsing only)
  #[error("Locale error: {0}")]
  Locale(#[from] LocaleError),

  /// Line breaking error
  #[error("Line break error: {0}")]
  Break(#[from] BreakError),
}

/// Errors from strict locale parsing
///
/// The lenient parser (`LocaleTag::new`) never fails; it leaves the tag
/// unpopulated instead. The strict parser (`LocaleTag::from_str`) reports
/// why the input was rejected.
#[derive(Error, Debug, Clone)]
pub enum LocaleError {
  /// The language subtag is not a 2- or 3-letter lowercase code
  #[error("Malformed language subtag: '{subtag}'")]
  MalformedLanguage { subtag: String },
}

/// Errors that occur during line breaking
#[derive(Error, Debug, Clone)]
pub enum BreakError {
  /// A code unit the optimal breaker cannot handle (currently only TAB).
  ///
  /// Fatal for the paragraph; callers must expand tabs before measuring.
  #[error("Unsupported code unit U+{code_unit:04X} at offset {offset}")]
  UnsupportedChar { offset: u32, code_unit: u16 },

  /// Hyphenation patterns could not be loaded for a language
  #[error("Hyphenation patterns unavailable for '{language}': {reason}")]
  HyphenationFailed { language: String, reason: String },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_locale_error_malformed_language() {
    let error = LocaleError::MalformedLanguage {
      subtag: "Deutsch".to_string(),
    };
    assert!(format!("{}", error).contains("Deutsch"));
  }

  #[test]
  fn test_break_error_unsupported_char() {
    let error = BreakError::UnsupportedChar {
      offset: 12,
      code_unit: 0x0009,
    };
    let display = format!("{}", error);
    assert!(display.contains("U+0009"));
    assert!(display.contains("offset 12"));
  }

  #[test]
  fn test_break_error_hyphenation_failed() {
    let error = BreakError::HyphenationFailed {
      language: "xx".to_string(),
      reason: "no embedded patterns".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("xx"));
    assert!(display.contains("no embedded patterns"));
  }

  #[test]
  fn test_error_from_locale_error() {
    let locale_error = LocaleError::MalformedLanguage {
      subtag: "x".to_string(),
    };
    let error: Error = locale_error.into();
    assert!(matches!(error, Error::Locale(_)));
  }

  #[test]
  fn test_error_from_break_error() {
    let break_error = BreakError::UnsupportedChar {
      offset: 0,
      code_unit: 9,
    };
    let error: Error = break_error.into();
    assert!(matches!(error, Error::Break(_)));
  }

  #[test]
  fn test_error_trait_implemented() {
    let error: Error = BreakError::UnsupportedChar {
      offset: 0,
      code_unit: 9,
    }
    .into();
    let _: &dyn std::error::Error = &error;
  }
}
