/// Error returned by a replacement function.
///
/// The translator never inspects it; it is handed back to the caller inside
/// [`TranslateError::Replacement`] exactly as the function produced it.
pub type ReplacementError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for placeholder translation
#[derive(Debug)]
pub enum TranslateError {
    /// The token pattern is not a valid regular expression
    InvalidPattern(String),
    /// The replacement function failed
    Replacement(ReplacementError),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::InvalidPattern(msg) => write!(f, "Invalid token pattern: {}", msg),
            TranslateError::Replacement(err) => write!(f, "Replacement failed: {}", err),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslateError::InvalidPattern(_) => None,
            TranslateError::Replacement(err) => Some(err.as_ref()),
        }
    }
}

/// Result type for translation
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Error types for the configuration loaders
///
/// Every variant carries the `location` of the source (a file path or URL)
/// so a diagnostics line is useful on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The source could not be read (missing file, connection refused, ...)
    Read { location: String, reason: String },
    /// The server answered with a status of 400 or above
    Http { location: String, status: u16 },
    /// The source is not valid JSON
    Parse { location: String, reason: String },
    /// The JSON document root is not an object
    NotAnObject { location: String },
    /// A mandatory key path does not resolve in the loaded document
    MissingKey { location: String, key: String },
    /// The key-value separator is empty
    InvalidSeparator,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Read { location, reason } => {
                write!(f, "Failed to read '{}': {}", location, reason)
            }
            LoadError::Http { location, status } => {
                write!(f, "Unable to read from URL {}. Status {}", location, status)
            }
            LoadError::Parse { location, reason } => {
                write!(f, "Failed to parse JSON from '{}': {}", location, reason)
            }
            LoadError::NotAnObject { location } => {
                write!(f, "Invalid JSON in '{}': root must be an object", location)
            }
            LoadError::MissingKey { location, key } => {
                write!(f, "Missing key '{}' in '{}'", key, location)
            }
            LoadError::InvalidSeparator => write!(f, "Key-value separator cannot be empty"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
