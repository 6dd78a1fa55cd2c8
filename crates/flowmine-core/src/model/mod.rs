//! Input data model: event index, succession matrix, and log statistics.

pub mod matrix;
pub mod stats;

pub use matrix::{Matrix, SuccessionMatrix};
pub use stats::{EventIndex, LogStatistics, StatisticsFile};
