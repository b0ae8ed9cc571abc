//! Custom error types for pagediff.

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid markup in {path}: {message}")]
    MarkupError { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("{0}")]
    Syntax(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("element <{0}> is never closed")]
    Unclosed(String),
}

/// A location string that cannot be turned back into path segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Malformed location {location:?}: {reason}")]
    Malformed { location: String, reason: String },
}

/// Raised when a diff cannot be computed. Distinct from "no differences".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("Diff unavailable: {0}")]
    Location(#[from] PathError),

    #[error("Diff unavailable: document nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PagediffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },
}

impl ParseError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn json_error(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }

    pub fn yaml_error(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlError {
            path: path.into(),
            source,
        }
    }

    pub fn toml_error(path: impl Into<String>, source: toml::de::Error) -> Self {
        Self::TomlError {
            path: path.into(),
            source,
        }
    }

    pub fn markup_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MarkupError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl PathError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
