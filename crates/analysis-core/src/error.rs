use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No data available")]
    NoData,

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Insufficient history for {symbol}: need {required}, have {actual}")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        actual: usize,
    },

    #[error("Model fit failed: {0}")]
    ModelFit(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
