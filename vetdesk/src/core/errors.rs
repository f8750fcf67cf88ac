//! Error taxonomy for backend calls and the user-facing messages derived from it.
//!
//! [`ApiError`] classifies what went wrong on the wire. The helper functions
//! turn it into the message each screen shows. Messages are in Spanish, the
//! clinic staff's language.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

pub const INVALID_CREDENTIALS: &str = "Credenciales inválidas";
pub const LOGIN_SERVICE_FAILED: &str = "Error en el servicio de login";
pub const SPECIES_FETCH_FAILED: &str = "Error fetching species";
pub const BREEDS_FETCH_FAILED: &str = "Error fetching breeds";
pub const SUBMISSION_FAILED: &str = "Error al completar el registro";
pub const TOKEN_INVALID: &str = "Token no válido o expirado";
pub const ACTIVATION_FAILED: &str = "Error al activar la cuenta";

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success status, with the server's `message` when it sent one.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },
    /// Success status but the body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided message, if non-blank.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Message shown on the login form.
pub fn login_failure_message(err: &ApiError) -> &'static str {
    match err.status() {
        Some(401) => INVALID_CREDENTIALS,
        _ => LOGIN_SERVICE_FAILED,
    }
}

/// Message shown when the owner email check fails.
pub fn lookup_failure_message(err: &ApiError) -> &'static str {
    match err.status() {
        Some(403) => "No tienes permisos para realizar esta acción",
        Some(500) => "Error en el servidor",
        _ => "Error al verificar el email",
    }
}

/// Form field an error message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Global,
    Username,
    Email,
    Password,
    Phone,
    Address,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Global => "global",
            FormField::Username => "username",
            FormField::Email => "email",
            FormField::Password => "password",
            FormField::Phone => "phone",
            FormField::Address => "address",
        }
    }
}

/// Field-level messages for a form, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<FormField, String>,
}

impl FormErrors {
    pub fn single(field: FormField, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn global(message: impl Into<String>) -> Self {
        Self::single(FormField::Global, message)
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            match field {
                FormField::Global => f.write_str(message)?,
                _ => write!(f, "{}: {}", field.as_str(), message)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

/// Map a failed `POST /auth/register` onto register form fields.
///
/// 409 and 400 are routed to a field by case-insensitive substring match on
/// the server message; everything else becomes a global message.
pub fn register_failure(err: &ApiError) -> FormErrors {
    let server = err.server_message();
    let lowered = server.map(str::to_lowercase).unwrap_or_default();
    match err.status() {
        Some(409) => {
            if lowered.contains("email") {
                FormErrors::single(FormField::Email, "Este email ya está en uso")
            } else if lowered.contains("user") || lowered.contains("usuario") {
                FormErrors::single(FormField::Username, "Este usuario ya existe")
            } else {
                FormErrors::global(server.unwrap_or("El usuario o email ya existe"))
            }
        }
        Some(400) => {
            if lowered.contains("password") || lowered.contains("contraseña") {
                FormErrors::single(
                    FormField::Password,
                    "La contraseña debe tener al menos 6 caracteres",
                )
            } else if lowered.contains("email") {
                FormErrors::single(FormField::Email, "Formato de email inválido")
            } else {
                FormErrors::global(server.unwrap_or("Datos inválidos"))
            }
        }
        _ => FormErrors::global(server.unwrap_or("Error en el registro")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status: code,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn login_maps_401_to_invalid_credentials() {
        assert_eq!(login_failure_message(&status(401, None)), INVALID_CREDENTIALS);
        assert_eq!(
            login_failure_message(&status(503, Some("down"))),
            LOGIN_SERVICE_FAILED
        );
        assert_eq!(
            login_failure_message(&ApiError::Network("refused".to_string())),
            LOGIN_SERVICE_FAILED
        );
    }

    #[test]
    fn register_conflict_routes_by_message_substring() {
        let email = register_failure(&status(409, Some("Email already registered")));
        assert_eq!(email.get(FormField::Email), Some("Este email ya está en uso"));

        let user = register_failure(&status(409, Some("El usuario ya existe")));
        assert_eq!(user.get(FormField::Username), Some("Este usuario ya existe"));

        let other = register_failure(&status(409, None));
        assert_eq!(other.get(FormField::Global), Some("El usuario o email ya existe"));
    }

    #[test]
    fn register_bad_request_routes_by_message_substring() {
        let password = register_failure(&status(400, Some("Contraseña demasiado corta")));
        assert!(password.get(FormField::Password).is_some());

        let email = register_failure(&status(400, Some("Email inválido")));
        assert_eq!(email.get(FormField::Email), Some("Formato de email inválido"));

        let other = register_failure(&status(400, Some("Teléfono necesario")));
        assert_eq!(other.get(FormField::Global), Some("Teléfono necesario"));
    }

    #[test]
    fn register_unknown_failure_is_global() {
        let errors = register_failure(&ApiError::Network("timeout".to_string()));
        assert_eq!(errors.get(FormField::Global), Some("Error en el registro"));
        assert_eq!(errors.to_string(), "Error en el registro");
    }

    #[test]
    fn blank_server_message_uses_fallback() {
        let err = status(500, Some("   "));
        assert_eq!(err.message_or(SUBMISSION_FAILED), SUBMISSION_FAILED);
    }

    #[test]
    fn form_errors_display_prefixes_fields() {
        let mut errors = FormErrors::single(FormField::Email, "mal");
        errors.insert(FormField::Password, "corta");
        errors.insert(FormField::Email, "ignored");
        assert_eq!(errors.to_string(), "email: mal; password: corta");
    }
}
