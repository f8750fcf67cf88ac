//! Test-only helpers: a scripted in-memory backend and fixtures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::core::errors::ApiError;
use crate::core::forms::RegisterForm;
use crate::core::session::Session;
use crate::core::types::{
    ActivationRequest, AuthResponse, Breed, Credentials, LoginRole, NewOwner, NewPet,
    OwnerSummary, PetFilter, PetSummary, Species, UserIdentity,
};
use crate::io::backend::Backend;
use crate::io::session_storage::FileSessionStorage;

/// Backend operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    VerifyToken,
    Activate,
    Species,
    Breeds,
    SearchPets,
    LookupOwner,
    CreateOwner,
    CreatePet,
}

/// Call recorded by [`ScriptedBackend`], in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login { role: LoginRole, username: String },
    Register { username: String },
    VerifyToken(String),
    Activate(String),
    ListSpecies,
    ListBreeds(i64),
    SearchPets { token: Option<String>, filter: PetFilter },
    LookupOwner { token: String, email: String },
    CreateOwner(NewOwner),
    CreatePet(NewPet),
}

/// Backend answering from memory. Unscripted endpoints succeed with empty data.
#[derive(Default)]
pub struct ScriptedBackend {
    species: Vec<Species>,
    breeds: BTreeMap<i64, Vec<Breed>>,
    pets: Vec<PetSummary>,
    owners: BTreeMap<String, OwnerSummary>,
    accounts: Vec<(LoginRole, Credentials, AuthResponse)>,
    /// Error per endpoint, returned once that many calls have succeeded.
    failures: HashMap<Endpoint, (usize, ApiError)>,
    calls: Mutex<Vec<(Endpoint, Call)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species(mut self, species: Vec<Species>) -> Self {
        self.species = species;
        self
    }

    pub fn with_breeds(mut self, species_id: i64, breeds: Vec<Breed>) -> Self {
        self.breeds.insert(species_id, breeds);
        self
    }

    pub fn with_pets(mut self, pets: Vec<PetSummary>) -> Self {
        self.pets = pets;
        self
    }

    pub fn with_owner(mut self, owner: OwnerSummary) -> Self {
        self.owners.insert(owner.email.clone(), owner);
        self
    }

    pub fn with_account(mut self, role: LoginRole, username: &str, password: &str) -> Self {
        let auth = auth_response(&format!("token-{}", username), username, role);
        self.accounts.push((
            role,
            Credentials {
                username: username.to_string(),
                password: password.to_string(),
            },
            auth,
        ));
        self
    }

    pub fn failing(self, endpoint: Endpoint, err: ApiError) -> Self {
        self.failing_after(endpoint, 0, err)
    }

    /// Let `successes` calls to `endpoint` through, then fail with `err`.
    pub fn failing_after(mut self, endpoint: Endpoint, successes: usize, err: ApiError) -> Self {
        self.failures.insert(endpoint, (successes, err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|(_, call)| call.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, endpoint: Endpoint, call: Call) -> Result<(), ApiError> {
        let previous = match self.calls.lock() {
            Ok(mut calls) => {
                let previous = calls.iter().filter(|(e, _)| *e == endpoint).count();
                calls.push((endpoint, call));
                previous
            }
            Err(_) => 0,
        };
        match self.failures.get(&endpoint) {
            Some((successes, err)) if previous >= *successes => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn login(
        &self,
        role: LoginRole,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ApiError> {
        self.record(
            Endpoint::Login,
            Call::Login {
                role,
                username: credentials.username.clone(),
            },
        )?;
        self.accounts
            .iter()
            .find(|(r, c, _)| *r == role && c == credentials)
            .map(|(_, _, auth)| auth.clone())
            .ok_or_else(|| status(401, None))
    }

    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ApiError> {
        self.record(
            Endpoint::Register,
            Call::Register {
                username: form.username.clone(),
            },
        )?;
        Ok(auth_response(
            &format!("token-{}", form.username),
            &form.username,
            LoginRole::User,
        ))
    }

    async fn verify_activation_token(&self, token: &str) -> Result<(), ApiError> {
        self.record(Endpoint::VerifyToken, Call::VerifyToken(token.to_string()))
    }

    async fn activate_account(&self, request: &ActivationRequest) -> Result<(), ApiError> {
        self.record(Endpoint::Activate, Call::Activate(request.token.clone()))
    }

    async fn list_species(&self) -> Result<Vec<Species>, ApiError> {
        self.record(Endpoint::Species, Call::ListSpecies)?;
        Ok(self.species.clone())
    }

    async fn list_breeds(&self, species_id: i64) -> Result<Vec<Breed>, ApiError> {
        self.record(Endpoint::Breeds, Call::ListBreeds(species_id))?;
        Ok(self.breeds.get(&species_id).cloned().unwrap_or_default())
    }

    async fn search_pets(
        &self,
        token: Option<&str>,
        filter: &PetFilter,
    ) -> Result<Vec<PetSummary>, ApiError> {
        self.record(
            Endpoint::SearchPets,
            Call::SearchPets {
                token: token.map(str::to_string),
                filter: filter.clone(),
            },
        )?;
        let name = filter.name.as_deref().map(str::to_lowercase);
        Ok(self
            .pets
            .iter()
            .filter(|pet| {
                name.as_deref()
                    .is_none_or(|name| pet.name.to_lowercase().contains(name))
            })
            .cloned()
            .collect())
    }

    async fn lookup_owner(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Option<OwnerSummary>, ApiError> {
        self.record(
            Endpoint::LookupOwner,
            Call::LookupOwner {
                token: token.to_string(),
                email: email.to_string(),
            },
        )?;
        Ok(self.owners.get(email).cloned())
    }

    async fn create_owner(&self, _token: &str, owner: &NewOwner) -> Result<(), ApiError> {
        self.record(Endpoint::CreateOwner, Call::CreateOwner(owner.clone()))
    }

    async fn create_pet(&self, _token: &str, pet: &NewPet) -> Result<PetSummary, ApiError> {
        self.record(Endpoint::CreatePet, Call::CreatePet(pet.clone()))?;
        Ok(pet_summary(1, &pet.name))
    }
}

pub fn status(code: u16, message: Option<&str>) -> ApiError {
    ApiError::Status {
        status: code,
        message: message.map(str::to_string),
    }
}

pub fn auth_response(token: &str, username: &str, role: LoginRole) -> AuthResponse {
    AuthResponse {
        token: token.to_string(),
        user: UserIdentity {
            username: Some(username.to_string()),
            role: Some(role.as_str().to_uppercase()),
            ..UserIdentity::default()
        },
    }
}

pub fn session(token: &str) -> Session {
    Session::from_auth(auth_response(token, "vet1", LoginRole::Vet))
}

pub fn species(id: i64, name: &str) -> Species {
    Species {
        id,
        name: name.to_string(),
    }
}

pub fn breed(id: i64, name: &str) -> Breed {
    Breed {
        id,
        name: name.to_string(),
    }
}

pub fn pet_summary(id: i64, name: &str) -> PetSummary {
    PetSummary {
        id: Some(id),
        name: name.to_string(),
        birth_date: None,
        specie: None,
        breed: None,
        weight: None,
        diet_info: None,
        created_at: None,
    }
}

/// Catalog with dogs (1) and cats (2), each with two breeds.
pub fn catalog_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .with_species(vec![species(1, "Perro"), species(2, "Gato")])
        .with_breeds(1, vec![breed(10, "Beagle"), breed(11, "Boxer")])
        .with_breeds(2, vec![breed(20, "Siamés"), breed(21, "Persa")])
}

/// Temporary state dir with file-backed session storage.
pub fn temp_session_storage() -> std::io::Result<(TempDir, FileSessionStorage)> {
    let temp = tempfile::tempdir()?;
    let storage = FileSessionStorage::new(&temp.path().join("session"));
    Ok((temp, storage))
}
