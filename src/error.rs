use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Missing field `{field}` for {repo}/{owner}")]
    MissingField {
        repo: String,
        owner: String,
        field: String,
    },
    #[error("Schema mismatch for {repo}: only in {owner_a}: {only_in_a:?}, only in {owner_b}: {only_in_b:?}")]
    SchemaMismatch {
        repo: String,
        owner_a: String,
        owner_b: String,
        only_in_a: Vec<String>,
        only_in_b: Vec<String>,
    },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Invalid quarter key: {0}")]
    InvalidQuarterKey(String),
    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),
    #[error("Cell {cell} is already used by a metric block")]
    CellOverlap { cell: String },
    #[error("Count overflow: {0}")]
    Overflow(String),
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),
    #[error("No raw data for {repo}/{owner}")]
    UnknownRepository { repo: String, owner: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetricsError {
    pub fn missing_field(repo: &str, owner: &str, field: impl ToString) -> Self {
        MetricsError::MissingField {
            repo: repo.to_string(),
            owner: owner.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_field(field: impl ToString, reason: impl ToString) -> Self {
        MetricsError::InvalidField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
