use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DpestResult<T> = Result<T, DpestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    NotFound,
    Layout,
    Io,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "Configuration",
            Self::Validation => "Validation",
            Self::NotFound => "NotFound",
            Self::Layout => "Layout",
            Self::Io => "Io",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Validation => 2,
            Self::Io => 3,
            Self::NotFound => 4,
            Self::Layout => 5,
            Self::Configuration => 6,
        }
    }
}

/// Error value shared by every generator. Carries a stable machine-readable
/// code alongside the human message so callers can match on failures without
/// parsing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpestError {
    category: ErrorCategory,
    code: &'static str,
    message: String,
}

impl DpestError {
    pub fn new(category: ErrorCategory, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn configuration(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Configuration, code, message)
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, code, message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, code, message)
    }

    pub fn layout(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Layout, code, message)
    }

    pub fn io(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Io, code, message)
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }
}

impl Display for DpestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for DpestError {}
