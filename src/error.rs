use thiserror::Error;

use crate::tree::NodeId;

#[derive(Error, Debug)]
pub enum RegForestError {
    /// Invalid parameters or space bounds, raised before any growth starts.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A split left one side without samples. The split search only proposes
    /// thresholds strictly inside the admissible range, so this is a logic error.
    #[error("Empty partition for split ({dim}, {threshold}): {lower} lower / {upper} upper samples")]
    EmptyPartition {
        dim: usize,
        threshold: f64,
        lower: usize,
        upper: usize,
    },

    #[error("Node {node:?} is already split")]
    NodeAlreadySplit { node: NodeId },

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

impl RegForestError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegForestError>;
