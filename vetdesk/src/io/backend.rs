//! Backend abstraction for the clinic REST API.
//!
//! The [`Backend`] trait decouples the views from the HTTP transport. Tests
//! use scripted backends that answer from memory and record every call.

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::core::forms::RegisterForm;
use crate::core::types::{
    ActivationRequest, AuthResponse, Breed, Credentials, LoginRole, NewOwner, NewPet,
    OwnerSummary, PetFilter, PetSummary, Species,
};

#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(
        &self,
        role: LoginRole,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ApiError>;

    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ApiError>;

    async fn verify_activation_token(&self, token: &str) -> Result<(), ApiError>;

    async fn activate_account(&self, request: &ActivationRequest) -> Result<(), ApiError>;

    async fn list_species(&self) -> Result<Vec<Species>, ApiError>;

    async fn list_breeds(&self, species_id: i64) -> Result<Vec<Breed>, ApiError>;

    async fn search_pets(
        &self,
        token: Option<&str>,
        filter: &PetFilter,
    ) -> Result<Vec<PetSummary>, ApiError>;

    /// `Ok(None)` means the backend answered and no owner has this email.
    async fn lookup_owner(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Option<OwnerSummary>, ApiError>;

    async fn create_owner(&self, token: &str, owner: &NewOwner) -> Result<(), ApiError>;

    async fn create_pet(&self, token: &str, pet: &NewPet) -> Result<PetSummary, ApiError>;
}
