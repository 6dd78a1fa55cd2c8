use std::fmt;
use std::io;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    StatisticsParseError,
    StatisticsReadFailed,
    ShapeMismatch,
    DuplicateEvent,
    UnknownEvent,
    MagnitudeNotFound,
    InvalidMinFrequency,
    InvalidDependencyThreshold,
    InvalidScaleBounds,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::StatisticsParseError => "E1002",
            Self::StatisticsReadFailed => "E1003",
            Self::ShapeMismatch => "E2001",
            Self::DuplicateEvent => "E2002",
            Self::UnknownEvent => "E2003",
            Self::MagnitudeNotFound => "E3001",
            Self::InvalidMinFrequency => "E4001",
            Self::InvalidDependencyThreshold => "E4002",
            Self::InvalidScaleBounds => "E4003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::StatisticsParseError => "Log statistics parse error",
            Self::StatisticsReadFailed => "Log statistics could not be read",
            Self::ShapeMismatch => "Succession matrix shape mismatch",
            Self::DuplicateEvent => "Duplicate event identifier",
            Self::UnknownEvent => "Unknown event identifier",
            Self::MagnitudeNotFound => "Magnitude not present in scale table",
            Self::InvalidMinFrequency => "Invalid minimum frequency",
            Self::InvalidDependencyThreshold => "Invalid dependency threshold",
            Self::InvalidScaleBounds => "Invalid scale score bounds",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .flowmine/config.toml and retry."),
            Self::StatisticsParseError => Some(
                "Expected a JSON object with events, succession, appearance, start and end.",
            ),
            Self::StatisticsReadFailed => Some("Check that the file exists and is readable."),
            Self::ShapeMismatch => Some(
                "The succession matrix must be square with one row per listed event.",
            ),
            Self::DuplicateEvent => Some("List each event identifier exactly once."),
            Self::UnknownEvent => {
                Some("Start, end and appearance entries must name listed events.")
            }
            Self::MagnitudeNotFound => None,
            Self::InvalidMinFrequency => Some("Use a finite, non-negative minimum frequency."),
            Self::InvalidDependencyThreshold => {
                Some("Use a dependency threshold between 0.0 and 1.0.")
            }
            Self::InvalidScaleBounds => {
                Some("Set finite [scale] score_min and score_max with score_min <= score_max.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while validating log statistics or mining a graph.
///
/// Every variant is fatal to the call that produced it. Nothing in the
/// engine retries; a failed call emits no partial graph.
#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    /// The succession matrix is not square, or its dimension disagrees
    /// with the number of listed events.
    #[error(
        "succession matrix shape mismatch: {rows} rows, {columns} columns, expected {expected}"
    )]
    ShapeMismatch {
        rows: usize,
        columns: usize,
        expected: usize,
    },

    #[error("event {0:?} is listed more than once")]
    DuplicateEvent(String),

    #[error("event {0:?} is not part of the event index")]
    UnknownEvent(String),

    /// A scale table was queried with a magnitude it was never fitted on.
    #[error("magnitude {magnitude} was not seen when the scale was fitted")]
    NotFound { magnitude: f64 },

    #[error("minimum frequency must be finite and non-negative, got {0}")]
    InvalidMinFrequency(f64),

    #[error("dependency threshold must lie in [0, 1], got {0}")]
    InvalidDependencyThreshold(f64),

    /// Scale score range is inverted or not finite.
    #[error("scale score bounds must be finite with min <= max, got [{min}, {max}]")]
    InvalidScaleBounds { min: f64, max: f64 },

    #[error("failed to parse log statistics: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read log statistics: {0}")]
    Io(#[from] io::Error),
}

impl MiningError {
    /// Map the error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ShapeMismatch { .. } => ErrorCode::ShapeMismatch,
            Self::DuplicateEvent(_) => ErrorCode::DuplicateEvent,
            Self::UnknownEvent(_) => ErrorCode::UnknownEvent,
            Self::NotFound { .. } => ErrorCode::MagnitudeNotFound,
            Self::InvalidMinFrequency(_) => ErrorCode::InvalidMinFrequency,
            Self::InvalidDependencyThreshold(_) => ErrorCode::InvalidDependencyThreshold,
            Self::InvalidScaleBounds { .. } => ErrorCode::InvalidScaleBounds,
            Self::Parse(_) => ErrorCode::StatisticsParseError,
            Self::Io(_) => ErrorCode::StatisticsReadFailed,
        }
    }
}
