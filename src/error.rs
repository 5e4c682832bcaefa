use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No CSV files found in {0}")]
    NoInputFiles(String),

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Year {year} has no interval label; refusing to build a partially labeled dataset")]
    UnmappedYear { year: i64 },

    #[error("Scenario '{0}' is not present in the data")]
    MissingScenario(String),

    #[error("Invalid {kind} selection: '{value}'")]
    InvalidSelection { kind: &'static str, value: String },

    #[error("Lookup tables error: {0}")]
    Tables(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ImpactError>;
