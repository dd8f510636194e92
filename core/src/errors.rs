use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Validation error: {reason}")]
    Validation { reason: String },

    #[error("Format error: {reason}")]
    Format { reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {origin}: {error}")]
    LoadFailed {
        origin: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, FunctionError>;

impl From<serde_json::Error> for FunctionError {
    fn from(err: serde_json::Error) -> Self {
        FunctionError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for FunctionError {
    fn from(err: serde_yaml::Error) -> Self {
        FunctionError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl FunctionError {
    /// Handler failures depend only on the request and config, so replaying
    /// the same invocation fails the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FunctionError::Io(_))
    }

    /// Short tag reported to callers alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            FunctionError::Validation { .. } => "validation",
            FunctionError::Format { .. } => "format",
            FunctionError::Config(_) => "config",
            FunctionError::UnknownFunction { .. } => "unknown_function",
            FunctionError::Serialization(_) => "serialization",
            FunctionError::Io(_) => "io",
            FunctionError::Generic(_) => "internal",
        }
    }
}
