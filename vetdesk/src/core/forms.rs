//! Local validation for the account forms, run before any network call.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{FormErrors, FormField};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 .()\-]{7,25}$").expect("valid phone pattern"));

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_ACCOUNT_ROLE: &str = "USER";

/// Account registration form; also the `POST /auth/register` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub role: String,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            phone: String::new(),
            address: String::new(),
            role: DEFAULT_ACCOUNT_ROLE.to_string(),
        }
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        let username_len = self.username.trim().chars().count();
        if !(3..=50).contains(&username_len) {
            errors.insert(
                FormField::Username,
                "El usuario debe tener entre 3 y 50 caracteres",
            );
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            errors.insert(FormField::Email, "Formato de email inválido");
        }
        if !PHONE_RE.is_match(self.phone.trim()) {
            errors.insert(FormField::Phone, "Teléfono inválido");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                FormField::Password,
                "La contraseña debe tener al menos 6 caracteres",
            );
        }
        if self.address.chars().count() > 100 {
            errors.insert(
                FormField::Address,
                "La dirección no puede superar los 100 caracteres",
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Check the new password pair on the activation screen.
pub fn check_new_password(new_password: &str, confirm_password: &str) -> Result<(), &'static str> {
    if new_password != confirm_password {
        return Err("Las contraseñas no coinciden.");
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err("La contraseña debe tener al menos 6 caracteres.");
    }
    Ok(())
}
