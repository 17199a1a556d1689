use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("record source failure while reading {family}: {details}")]
    SourceFailure {
        family: &'static str,
        details: String,
    },

    #[error("invalid date input: {0}")]
    InvalidDate(String),

    #[error("computation failed in {section}: {details}")]
    Computation {
        section: &'static str,
        details: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
