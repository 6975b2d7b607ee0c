use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("row {row}: invalid value for `{column}`: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    #[error("unknown result: {0}")]
    UnknownResult(String),

    #[error("unknown body part: {0}")]
    UnknownBodyPart(String),

    #[error("match {game_id}: action {index} has {field}={value}, outside [0, {limit}]")]
    OutOfBounds {
        game_id: u64,
        index: usize,
        field: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("match {game_id}: action {index} has invalid period {period}")]
    InvalidPeriod { game_id: u64, index: usize, period: u8 },

    #[error("match {game_id}: action {index} has invalid time {seconds}")]
    InvalidTime {
        game_id: u64,
        index: usize,
        seconds: f64,
    },

    #[error("match {game_id}: action {index} is earlier than the action before it")]
    OutOfOrder { game_id: u64, index: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("rows misaligned: {0}")]
    Misaligned(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
