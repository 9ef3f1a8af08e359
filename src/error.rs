use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    DealershipNotFound,
    UserNotFound,
    GeneratorNotFound,
    TaskNotFound,
    ShiftNotFound,
    AmbiguousRef,
    NotAssigned,
    TaskArchived,
    ShiftAlreadyClosed,
    InvalidRecurrence,
    InvalidSetting,
    IntegrityError,
    InvalidTimezone,
    ValidationError,
    DatabaseError,
}

/// How a sweep should treat a failed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Broken generator definition or settings. Skipped until someone fixes it.
    Configuration,
    /// Lock contention, IO. Retried on the next invocation.
    Transient,
    /// Dangling references (dealership, assignees).
    Integrity,
    /// Bad input on a request path; never produced by sweeps.
    Request,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::DealershipNotFound => "DEALERSHIP_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::GeneratorNotFound => "GENERATOR_NOT_FOUND",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::ShiftNotFound => "SHIFT_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::TaskArchived => "TASK_ARCHIVED",
            Self::ShiftAlreadyClosed => "SHIFT_ALREADY_CLOSED",
            Self::InvalidRecurrence => "INVALID_RECURRENCE",
            Self::InvalidSetting => "INVALID_SETTING",
            Self::IntegrityError => "INTEGRITY_ERROR",
            Self::InvalidTimezone => "INVALID_TIMEZONE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRecurrence | Self::InvalidSetting | Self::InvalidTimezone => ErrorClass::Configuration,
            Self::DatabaseError => ErrorClass::Transient,
            Self::IntegrityError | Self::DealershipNotFound | Self::UserNotFound => {
                ErrorClass::Integrity
            }
            _ => ErrorClass::Request,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ShiftopsError {
    pub code: ErrorCode,
    pub message: String,
}

impl ShiftopsError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        self.code.class()
    }

    pub fn not_initialized(path: &str) -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            format!("No database at {path}. Run `shiftops init` first."),
        )
    }

    pub fn dealership_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::DealershipNotFound,
            format!("Dealership not found: {reference}"),
        )
    }

    pub fn user_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::UserNotFound, format!("User not found: {reference}"))
    }

    pub fn generator_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::GeneratorNotFound,
            format!("Generator not found: {reference}"),
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {reference}"))
    }

    pub fn shift_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::ShiftNotFound, format!("Shift not found: {reference}"))
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn not_assigned(task_id: &str, user_id: &str) -> Self {
        Self::new(
            ErrorCode::NotAssigned,
            format!("User {user_id} is not assigned to task {task_id}"),
        )
    }

    pub fn task_archived(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskArchived,
            format!("Task {task_id} is archived and no longer accepts responses"),
        )
    }

    pub fn shift_already_closed(shift_id: &str) -> Self {
        Self::new(
            ErrorCode::ShiftAlreadyClosed,
            format!("Shift {shift_id} is already closed"),
        )
    }

    pub fn invalid_recurrence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRecurrence, message)
    }

    pub fn invalid_setting(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidSetting,
            format!("Invalid value for setting {key}: '{value}'"),
        )
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IntegrityError, message)
    }

    pub fn invalid_timezone(name: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTimezone,
            format!("Unknown timezone: {name}"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for ShiftopsError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}

impl From<serde_json::Error> for ShiftopsError {
    fn from(e: serde_json::Error) -> Self {
        Self::validation(format!("Invalid JSON: {e}"))
    }
}
