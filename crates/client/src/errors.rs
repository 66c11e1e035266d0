//! Backend error taxonomy and its translation to display text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use itematic_auth::AuthzError;

/// Shown when nothing more specific can be said.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Error body returned by the backend. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Usually a string; validation failures may send a list of objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// Decode a response body; bodies that are not an error object become the
    /// `message` verbatim.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ErrorPayload>(body) {
            Ok(payload) => payload,
            Err(_) if body.trim().is_empty() => Self::default(),
            _ => Self {
                message: Some(body.trim().to_string()),
                ..Self::default()
            },
        }
    }

    pub fn detail_str(&self) -> Option<&str> {
        self.detail.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {payload:?}")]
    Backend { status: u16, payload: ErrorPayload },

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Setup(String),

    #[error("invalid form field: {0}")]
    Form(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Backend { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Classify the error. The order is fixed: known `code`, `detail` naming a
    /// known code (whole or as a `CODE:` prefix), raw `detail`, `message`,
    /// transport failure.
    pub fn failure(&self) -> Failure {
        let payload = match self {
            ApiError::Backend { payload, .. } => payload,
            ApiError::Network(msg)
            | ApiError::Decode(msg)
            | ApiError::InvalidUrl(msg)
            | ApiError::Setup(msg)
            | ApiError::Form(msg) => {
                return Failure::Transport(msg.clone());
            }
        };

        if let Some(code) = payload.code.as_deref().and_then(ErrorCode::parse) {
            return Failure::Coded(code);
        }

        if let Some(detail) = payload.detail_str() {
            if let Some(code) = ErrorCode::parse(detail) {
                return Failure::Coded(code);
            }
            if let Some(code) = detail_prefix(detail).and_then(ErrorCode::parse) {
                return Failure::Coded(code);
            }
            return Failure::Detail(detail.to_string());
        }

        if let Some(message) = payload.message.as_deref().filter(|m| !m.is_empty()) {
            return Failure::Message(message.to_string());
        }

        Failure::Unknown
    }
}

/// Extract `CODE` from a `CODE: human text` detail.
fn detail_prefix(detail: &str) -> Option<&str> {
    let (head, _) = detail.split_once(':')?;
    let valid = !head.is_empty() && head.chars().all(|c| c.is_ascii_uppercase() || c == '_');
    valid.then_some(head)
}

/// Deterministic classification of an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Coded(ErrorCode),
    Detail(String),
    Message(String),
    Transport(String),
    Unknown,
}

impl Failure {
    pub fn display(&self) -> String {
        match self {
            Failure::Coded(code) => code.message().to_string(),
            Failure::Detail(text) | Failure::Message(text) | Failure::Transport(text) => text.clone(),
            Failure::Unknown => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

/// User-facing text for an API error.
pub fn translate(error: &ApiError) -> String {
    error.failure().display()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    BusinessLogic,
    Authentication,
    Authorization,
    NotFound,
}

macro_rules! error_codes {
    ($($variant:ident => ($code:literal, $category:ident, $message:literal)),+ $(,)?) => {
        /// Error codes the backend is known to emit.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($variant),+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $code),+
                }
            }

            pub fn category(&self) -> ErrorCategory {
                match self {
                    $(ErrorCode::$variant => ErrorCategory::$category),+
                }
            }

            pub fn message(&self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $message),+
                }
            }

            pub fn parse(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(ErrorCode::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

error_codes! {
    NameTooShort => ("NAME_TOO_SHORT", Validation, "The name must be at least 3 characters long"),
    NameTooLong => ("NAME_TOO_LONG", Validation, "The name cannot exceed 50 characters"),
    InvalidNifFormat => ("INVALID_NIF_FORMAT", Validation, "The tax ID (NIF) has an invalid format"),
    EmailTooLong => ("EMAIL_TOO_LONG", Validation, "The email cannot exceed 50 characters"),
    InvalidEmailFormat => ("INVALID_EMAIL_FORMAT", Validation, "The email has an invalid format"),
    UsernameTooShort => ("USERNAME_TOO_SHORT", Validation, "The username must be at least 3 characters long"),
    UsernameTooLong => ("USERNAME_TOO_LONG", Validation, "The username cannot exceed 50 characters"),
    UsernameContainsSpaces => ("USERNAME_CONTAINS_SPACES", Validation, "The username cannot contain spaces"),
    UsernameInvalidCharacters => (
        "USERNAME_INVALID_CHARACTERS",
        Validation,
        "The username may only contain letters, digits, dots, hyphens and underscores"
    ),
    InvalidUsernameFormat => ("INVALID_USERNAME_FORMAT", Validation, "The username has an invalid format"),
    PasswordTooShort => ("PASSWORD_TOO_SHORT", Validation, "The password must be at least 8 characters long"),
    PasswordTooLong => ("PASSWORD_TOO_LONG", Validation, "The password cannot exceed 72 characters"),
    InvalidPasswordFormat => ("INVALID_PASSWORD_FORMAT", Validation, "The password must be between 8 and 72 characters"),
    CompanyEmailAlreadyExists => ("COMPANY_EMAIL_ALREADY_EXISTS", BusinessLogic, "The company email is already in use"),
    CompanyNifAlreadyExists => ("COMPANY_NIF_ALREADY_EXISTS", BusinessLogic, "The tax ID (NIF) is already registered"),
    UsernameAlreadyExists => ("USERNAME_ALREADY_EXISTS", BusinessLogic, "The username is already in use"),
    InvalidCredentials => ("INVALID_CREDENTIALS", Authentication, "Invalid credentials"),
    InsufficientRole => ("INSUFFICIENT_ROLE", Authorization, "Insufficient role"),
    BranchAccessDenied => ("BRANCH_ACCESS_DENIED", Authorization, "Access to this branch is denied"),
    CompanyAccessDenied => ("COMPANY_ACCESS_DENIED", Authorization, "Access to this company is denied"),
    CompanyNotFound => ("COMPANY_NOT_FOUND", NotFound, "Company not found"),
    BranchNotFound => ("BRANCH_NOT_FOUND", NotFound, "Branch not found"),
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCode {
    /// Code matching a client-side authorization refusal.
    pub fn for_authz(err: &AuthzError) -> Option<Self> {
        match err {
            AuthzError::Unauthenticated => None,
            AuthzError::InsufficientRole(_) => Some(ErrorCode::InsufficientRole),
            AuthzError::BranchAccessDenied(_) => Some(ErrorCode::BranchAccessDenied),
        }
    }
}
