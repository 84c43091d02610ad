use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Interface `{name}` not found in source")]
    InterfaceNotFound { name: String },

    #[error("Body of {construct} has no matching closing brace")]
    UnbalancedBody { construct: String },

    #[error("Class `{class}` was found but its body delimiter could not be located")]
    ImplementationBodyNotFound { class: String },

    #[error("Domain `{property}` is missing capabilities: {missing}")]
    MissingCapabilities { property: String, missing: String },

    #[error("`{method}` is not part of the `{property}` contract")]
    MethodOutsideContract { property: String, method: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration `{field}`")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structure,
    Configuration,
    Capability,
    Io,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PartitionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InterfaceNotFound { .. }
            | Self::UnbalancedBody { .. }
            | Self::ImplementationBodyNotFound { .. } => ErrorCategory::Structure,
            Self::MissingCapabilities { .. } | Self::MethodOutsideContract { .. } => {
                ErrorCategory::Capability
            }
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) | Self::CsvError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Output
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Structure | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Capability => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InterfaceNotFound { name } => format!(
                "Check [interface].name and [interface].path; the file must declare `interface {} {{ ... }}`",
                name
            ),
            Self::UnbalancedBody { construct } => {
                format!("Look for an unterminated string, comment or brace inside {}", construct)
            }
            Self::ImplementationBodyNotFound { class } => {
                format!("Make sure `class {}` is followed by a `{{ ... }}` body", class)
            }
            Self::MissingCapabilities { property, .. } => format!(
                "Implement the listed methods on the backing value or remove them from the `{}` domain",
                property
            ),
            Self::MethodOutsideContract { property, method } => format!(
                "Call `{}` through the view that owns it, or add it to the `{}` domain",
                method, property
            ),
            Self::IoError(_) => "Check that the input files exist and the output directory is writable".to_string(),
            Self::SerializationError(_) | Self::CsvError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose and report the failing artifact".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix `{}` in the configuration file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Structure => format!("Input source could not be parsed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Capability => format!("Capability check failed: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Output => format!("Could not render output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PartitionError>;
