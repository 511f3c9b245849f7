//! Error types for the ivsurface library.
//!
//! All fallible operations return `Result<T, IvSurfError>` rather than panicking.
//! An undefined implied volatility is *not* an error: the solver reports it as
//! `None` and the pipeline drops the quote. Errors are reserved for invalid
//! configuration, empty stage outputs and I/O failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, IvSurfError>;

/// Pipeline stage that can produce an empty quote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Quote source returned no rows.
    Fetch,
    /// No raw row survived mid/volume/strike/expiry-window filtering.
    Prepare,
    /// No quote produced a defined, plausible implied volatility.
    Solve,
    /// The butterfly filter removed every quote.
    Filter,
    /// Surface construction was handed an empty collection.
    Build,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Prepare => "prepare",
            Stage::Solve => "solve",
            Stage::Filter => "filter",
            Stage::Build => "build",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building an implied volatility surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IvSurfError {
    /// Input data is invalid (e.g., non-finite rate, quote without IV, bad config).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A stage boundary produced no quotes; the run cannot continue.
    #[error("no data: {stage} stage produced an empty quote collection")]
    EmptyStage { stage: Stage },

    /// The grid is too sparse for row and column fill to complete it.
    #[error("insufficient data: {message}")]
    InsufficientData { message: String },

    /// The quote source failed to deliver data.
    #[error("quote source failed: {message}")]
    Source { message: String },

    /// Exported grid data is malformed.
    #[error("export error: {message}")]
    Export { message: String },

    /// Underlying I/O failure while reading or writing a grid file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stage_names_the_stage() {
        let err = IvSurfError::EmptyStage {
            stage: Stage::Filter,
        };
        let display = format!("{err}");
        assert!(display.contains("filter"), "got: {display}");
        assert!(display.contains("no data"));
    }

    #[test]
    fn invalid_input_message_accessible() {
        let err = IvSurfError::InvalidInput {
            message: "strike must be positive".into(),
        };
        match &err {
            IvSurfError::InvalidInput { message } => {
                assert!(message.contains("positive"));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn error_display_includes_message() {
        let err = IvSurfError::InsufficientData {
            message: "row 2 has no known cells".into(),
        };
        assert!(format!("{err}").contains("row 2"));

        let err2 = IvSurfError::Source {
            message: "provider timeout".into(),
        };
        assert!(format!("{err2}").contains("provider timeout"));

        let err3 = IvSurfError::Export {
            message: "bad header".into(),
        };
        assert!(format!("{err3}").contains("bad header"));
    }

    #[test]
    fn io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::other("disk full"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(IvSurfError::Io(_))));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IvSurfError>();
    }
}
