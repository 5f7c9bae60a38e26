use crate::library::LibraryError;
use crate::material::DataFormatError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RcwaResult<T> = Result<T, RcwaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RcwaErrorCategory {
    InputValidationError,
    IoSystemError,
    InternalError,
}

impl RcwaErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Categorised error carried up to the process boundary.
///
/// `placeholder` is a stable dotted identifier (`INPUT.NK_FORMAT`,
/// `IO.NK_READ`, ...) that scripts can match on regardless of message wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcwaError {
    category: RcwaErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl RcwaError {
    pub fn new(
        category: RcwaErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            RcwaErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RcwaErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RcwaErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> RcwaErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for RcwaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for RcwaError {}

impl From<&DataFormatError> for RcwaError {
    fn from(error: &DataFormatError) -> Self {
        match error {
            DataFormatError::Read { .. } => Self::io_system("IO.NK_READ", error.to_string()),
            _ => Self::input_validation("INPUT.NK_FORMAT", error.to_string()),
        }
    }
}

impl From<DataFormatError> for RcwaError {
    fn from(error: DataFormatError) -> Self {
        Self::from(&error)
    }
}

impl From<LibraryError> for RcwaError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Load(source) => Self::from(&source),
            LibraryError::Scan { .. } => Self::io_system("IO.NK_LIBRARY", error.to_string()),
            LibraryError::InvalidName { .. } | LibraryError::NotFound { .. } => {
                Self::input_validation("INPUT.NK_LIBRARY", error.to_string())
            }
        }
    }
}
