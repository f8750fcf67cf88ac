//! Wire and reference types exchanged with the clinic backend.
//!
//! Field names follow the backend's JSON contract; Rust names stay snake_case
//! and are renamed through serde.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which login endpoint a credential pair is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginRole {
    User,
    Vet,
}

impl LoginRole {
    /// Path segment under `/auth/login/`.
    pub fn as_str(self) -> &'static str {
        match self {
            LoginRole::User => "user",
            LoginRole::Vet => "vet",
        }
    }
}

impl fmt::Display for LoginRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// User object returned by the backend and persisted with the session.
///
/// The backend has shipped several shapes of this object, so every field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surnames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserIdentity {
    /// Best available display name: username, then name, then email.
    pub fn display_name(&self) -> Option<&str> {
        [&self.username, &self.name, &self.email]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub id: i64,
    pub name: String,
}

/// Owner record resolved by the email lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub email: String,
    pub name: Option<String>,
}

/// Date as the backend renders it: ISO text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendDate {
    Text(String),
    Millis(i64),
}

impl fmt::Display for BackendDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendDate::Text(text) => f.write_str(text.split('T').next().unwrap_or(text)),
            BackendDate::Millis(millis) => match chrono::DateTime::from_timestamp_millis(*millis) {
                Some(at) => write!(f, "{}", at.date_naive()),
                None => write!(f, "{}", millis),
            },
        }
    }
}

/// Pet as listed by `GET /pets` and returned by `POST /pets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSummary {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<BackendDate>,
    #[serde(default)]
    pub specie: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, rename = "diet_info", alias = "dietInfo")]
    pub diet_info: Option<String>,
    #[serde(default)]
    pub created_at: Option<BackendDate>,
}

/// Body of `POST /pets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub birth_date: NaiveDate,
    pub specie_id: i64,
    pub breed_id: i64,
    pub weight: f64,
    pub diet_info: String,
    /// Owner the pet is attached to.
    pub email: String,
}

/// Body of the owner-creation call issued by the registration wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub surnames: String,
    pub email: String,
    pub phone: String,
    pub dni: String,
    pub role: String,
}

/// Placeholder surnames sent for owners created from the wizard.
pub const NEW_OWNER_SURNAMES: &str = "Owner";
/// Role assigned to owners created from the wizard.
pub const NEW_OWNER_ROLE: &str = "USER";

/// Query for `GET /pets`. Empty filters are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    pub name: Option<String>,
    pub species_id: Option<i64>,
    pub breed_id: Option<i64>,
}

impl PetFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("name", name.to_string()));
        }
        if let Some(id) = self.species_id {
            pairs.push(("specie_id", id.to_string()));
        }
        if let Some(id) = self.breed_id {
            pairs.push(("breed_id", id.to_string()));
        }
        pairs
    }
}
