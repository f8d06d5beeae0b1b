use std::fmt;

/// The main error type for configuration loading, composition, and resolution.
///
/// Codes are grouped by subsystem: 1xx parsing, 2xx paths, 3xx loading,
/// 4xx typed access, 5xx interpolation, 6xx overrides, 7xx export.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised by the document parser, with source location when available.
    ParseError {
        message: String,
        name: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a node is accessed as a kind it does not hold.
    TypeMismatch {
        expected: String,
        found: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for path expressions that do not follow the dotted grammar.
    MalformedPath {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when an assignment walks into a segment that does not exist.
    MissingPath {
        segment: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when an intermediate path segment refers to a non-mapping node.
    NotAMapping {
        segment: String,
        found: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a require-new assignment collides with an existing key.
    KeyAlreadyExists {
        segment: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when the assignment root is neither null nor a mapping.
    InvalidRoot {
        found: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for override expressions without an unescaped '='.
    MissingEquals {
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for override expressions with nothing before the '='.
    EmptyKey {
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for override expressions with nothing after the '='.
    EmptyValue {
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when interpolation re-enters a node that is still resolving.
    InterpolationCycle {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for a `${` without a closing `}`.
    UnterminatedPlaceholder {
        value: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when an interpolation reference names an absent node.
    TargetNotFound {
        reference: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when an interpolation reference lands on a sequence or mapping.
    NotScalar {
        reference: String,
        found: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a required defaults entry names a file that does not exist.
    IncludeNotFound {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a document includes itself, directly or transitively.
    RecursiveInclude {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for filesystem failures outside the include-existence check.
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised for runtime issues, such as an unformattable timestamp pattern.
    Runtime {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { message, name, line, column, hint, code } => {
                if *line > 0 || *column > 0 {
                    write!(f, "[STRATA] Parse Error in {} at {}:{}: {}{}",
                        name, line, column, message, suffix(hint, code))
                } else {
                    write!(f, "[STRATA] Parse Error in {}: {}{}",
                        name, message, suffix(hint, code))
                }
            }
            ConfigError::TypeMismatch { expected, found, hint, code } =>
                write!(f, "[STRATA] Type Mismatch: expected {}, found {}{}",
                    expected, found, suffix(hint, code)),
            ConfigError::MalformedPath { message, path, hint, code } =>
                write!(f, "[STRATA] Malformed Path '{}': {}{}",
                    path, message, suffix(hint, code)),
            ConfigError::MissingPath { segment, hint, code } =>
                write!(f, "[STRATA] Missing Path: key '{}' does not exist{}",
                    segment, suffix(hint, code)),
            ConfigError::NotAMapping { segment, found, hint, code } =>
                write!(f, "[STRATA] Not A Mapping: '{}' refers to a {} node{}",
                    segment, found, suffix(hint, code)),
            ConfigError::KeyAlreadyExists { segment, hint, code } =>
                write!(f, "[STRATA] Key Already Exists: cannot add '{}'{}",
                    segment, suffix(hint, code)),
            ConfigError::InvalidRoot { found, hint, code } =>
                write!(f, "[STRATA] Invalid Root: configuration root is {}, not a mapping{}",
                    found, suffix(hint, code)),
            ConfigError::MissingEquals { expression, hint, code } =>
                write!(f, "[STRATA] Override '{}' is missing '='{}",
                    expression, suffix(hint, code)),
            ConfigError::EmptyKey { expression, hint, code } =>
                write!(f, "[STRATA] Override '{}' has an empty key{}",
                    expression, suffix(hint, code)),
            ConfigError::EmptyValue { expression, hint, code } =>
                write!(f, "[STRATA] Override '{}' has an empty value{}",
                    expression, suffix(hint, code)),
            ConfigError::InterpolationCycle { path, hint, code } =>
                write!(f, "[STRATA] Interpolation cycle involving '{}'{}",
                    path, suffix(hint, code)),
            ConfigError::UnterminatedPlaceholder { value, hint, code } =>
                write!(f, "[STRATA] Unterminated ${{...}} placeholder in '{}'{}",
                    value, suffix(hint, code)),
            ConfigError::TargetNotFound { reference, hint, code } =>
                write!(f, "[STRATA] Interpolation reference '{}' not found{}",
                    reference, suffix(hint, code)),
            ConfigError::NotScalar { reference, found, hint, code } =>
                write!(f, "[STRATA] Interpolation reference '{}' is a {}, not a scalar{}",
                    reference, found, suffix(hint, code)),
            ConfigError::IncludeNotFound { path, hint, code } =>
                write!(f, "[STRATA] Included configuration '{}' not found{}",
                    path, suffix(hint, code)),
            ConfigError::RecursiveInclude { path, hint, code } =>
                write!(f, "[STRATA] Recursive configuration include involving '{}'{}",
                    path, suffix(hint, code)),
            ConfigError::FileError { message, path, hint, code } =>
                write!(f, "[STRATA] File Error '{}': {}{}",
                    path, message, suffix(hint, code)),
            ConfigError::Runtime { message, hint, code } =>
                write!(f, "[STRATA] Runtime Error: {}{}",
                    message, suffix(hint, code)),
        }
    }
}

impl std::error::Error for ConfigError {}
