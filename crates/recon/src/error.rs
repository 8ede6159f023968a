use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad window, duplicate alias, etc.).
    ConfigValidation(String),
    /// A caller-supplied date (filter bound, etc.) could not be parsed.
    DateParse { field: String, value: String },
    /// Input JSON could not be decoded into fixture/prediction records.
    Json(String),
    /// Pipeline invariant violated at runtime.
    Internal(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::DateParse { field, value } => {
                write!(f, "{field}: cannot parse date '{value}'")
            }
            Self::Json(msg) => write!(f, "invalid input JSON: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<serde_json::Error> for ReconError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
