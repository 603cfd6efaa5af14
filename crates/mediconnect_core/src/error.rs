use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::Role;

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Underlying cause of a configuration failure
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("{message}")]
    #[diagnostic(
        code(mediconnect_core::validation_failed),
        help("{}", fields.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; "))
    )]
    ValidationFailed {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Invalid email or password")]
    #[diagnostic(
        code(mediconnect_core::authentication_failed),
        help("Check the credentials and that you selected the right account type ({role})")
    )]
    AuthenticationFailed { role: Role },

    #[error("Email already in use")]
    #[diagnostic(
        code(mediconnect_core::email_taken),
        help("An account with '{email}' already exists. Log in instead, or use another email")
    )]
    EmailTaken { email: String },

    #[error("Not logged in")]
    #[diagnostic(
        code(mediconnect_core::not_authenticated),
        help("Log in before trying to {action}")
    )]
    NotAuthenticated { action: String },

    #[error("Permission denied")]
    #[diagnostic(
        code(mediconnect_core::permission_denied),
        help("A {role} account can't {action}")
    )]
    PermissionDenied { role: Role, action: String },

    #[error("{entity} not found")]
    #[diagnostic(
        code(mediconnect_core::not_found),
        help("No {entity} with ID '{id}' exists")
    )]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid appointment transition")]
    #[diagnostic(
        code(mediconnect_core::invalid_transition),
        help("Appointment {appointment_id} is {current}; it can't move to {requested}")
    )]
    InvalidTransition {
        appointment_id: String,
        current: String,
        requested: String,
    },

    #[error("Doctor is not accepting appointments")]
    #[diagnostic(
        code(mediconnect_core::doctor_unavailable),
        help("{doctor_name} is {reason}. Pick another doctor from the directory")
    )]
    DoctorUnavailable { doctor_name: String, reason: String },

    #[error("Review already submitted")]
    #[diagnostic(
        code(mediconnect_core::duplicate_review),
        help("Appointment {appointment_id} already has a review")
    )]
    DuplicateReview { appointment_id: String },

    #[error("Password hashing failed")]
    #[diagnostic(
        code(mediconnect_core::password_hash),
        help("The stored credential could not be processed")
    )]
    PasswordHash {
        #[source]
        cause: argon2::password_hash::Error,
    },

    #[error("Session storage failed")]
    #[diagnostic(
        code(mediconnect_core::session_storage),
        help("Could not {operation} the session at {location}")
    )]
    SessionStorage {
        operation: &'static str,
        location: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("Serialization error")]
    #[diagnostic(
        code(mediconnect_core::serialization_error),
        help("Failed to serialize/deserialize {data_type}")
    )]
    SerializationError {
        data_type: String,
        #[source]
        cause: serde_json::Error,
    },

    #[error("Configuration error")]
    #[diagnostic(
        code(mediconnect_core::configuration_error),
        help("Check configuration file at {config_path}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<argon2::password_hash::Error> for CoreError {
    fn from(cause: argon2::password_hash::Error) -> Self {
        Self::PasswordHash { cause }
    }
}

// Helper functions for creating common errors with context
impl CoreError {
    pub fn validation(fields: Vec<FieldError>) -> Self {
        let message = match fields.as_slice() {
            [single] => single.message.clone(),
            _ => format!("{} fields need attention", fields.len()),
        };
        Self::ValidationFailed { message, fields }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn not_authenticated(action: impl Into<String>) -> Self {
        Self::NotAuthenticated {
            action: action.into(),
        }
    }

    pub fn permission_denied(role: Role, action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            role,
            action: action.into(),
        }
    }

    /// Field errors for a validation failure, empty for every other variant
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationFailed { fields, .. } => fields,
            _ => &[],
        }
    }
}
