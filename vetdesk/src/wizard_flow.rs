//! Pet registration wizard wired to the backend.
//!
//! [`PetRegistration`] owns the [`Wizard`] drafts for as long as the wizard is
//! open and performs the catalog, lookup and submission calls the state
//! machine asks for. Submission is strictly sequential: the pet is only
//! created after the owner creation (when needed) has succeeded.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::cascade::BreedRefresh;
use crate::core::errors::{SPECIES_FETCH_FAILED, SUBMISSION_FAILED, lookup_failure_message};
use crate::core::session::Session;
use crate::core::types::{PetSummary, Species};
use crate::core::wizard::{OwnerExistence, Wizard, WizardError, WizardStep};
use crate::io::backend::Backend;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardFlowError {
    /// Rejected locally; no call was made.
    #[error(transparent)]
    Rejected(#[from] WizardError),
    #[error("{0}")]
    Lookup(String),
    /// Owner or pet creation failed; the wizard stays open for a retry.
    #[error("{0}")]
    Submit(String),
}

pub struct PetRegistration<'a, B: Backend + ?Sized> {
    backend: &'a B,
    token: String,
    species: Vec<Species>,
    species_error: Option<String>,
    wizard: Wizard,
}

impl<'a, B: Backend + ?Sized> PetRegistration<'a, B> {
    /// Open the wizard and load the species list.
    ///
    /// A species failure is kept as a notice; the wizard still opens.
    pub async fn open(backend: &'a B, session: &Session) -> Self {
        let (species, species_error) = match backend.list_species().await {
            Ok(species) => (species, None),
            Err(err) => {
                warn!(error = %err, "species fetch failed");
                (Vec::new(), Some(SPECIES_FETCH_FAILED.to_string()))
            }
        };
        Self {
            backend,
            token: session.token.clone(),
            species,
            species_error,
            wizard: Wizard::new(),
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_error(&self) -> Option<&str> {
        self.species_error.as_deref()
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn existence(&self) -> &OwnerExistence {
        self.wizard.existence()
    }

    pub fn set_pet_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_pet_name(name)
    }

    pub fn set_birth_date(&mut self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.wizard.set_birth_date(date)
    }

    pub fn set_weight(&mut self, weight: Option<f64>) -> Result<(), WizardError> {
        self.wizard.set_weight(weight)
    }

    pub fn set_allergies(&mut self, allergies: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_allergies(allergies)
    }

    pub fn set_diet_info(&mut self, diet_info: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_diet_info(diet_info)
    }

    /// Change species and reload its breeds. Breed failures leave an empty list.
    #[instrument(skip(self))]
    pub async fn select_species(&mut self, species_id: Option<i64>) -> Result<(), WizardError> {
        let BreedRefresh::Fetch(id) = self.wizard.select_species(species_id)? else {
            return Ok(());
        };
        let breeds = match self.backend.list_breeds(id).await {
            Ok(breeds) => breeds,
            Err(err) => {
                warn!(species_id = id, error = %err, "breed fetch failed; leaving list empty");
                Vec::new()
            }
        };
        if !self.wizard.apply_breeds(id, breeds) {
            debug!(species_id = id, "discarded breeds for deselected species");
        }
        Ok(())
    }

    pub fn select_breed(&mut self, breed_id: Option<i64>) -> Result<(), WizardError> {
        self.wizard.select_breed(breed_id)
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.wizard.advance()
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.wizard.back()
    }

    pub fn set_owner_email(&mut self, email: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_owner_email(email)
    }

    pub fn set_owner_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_owner_name(name)
    }

    pub fn set_owner_dni(&mut self, dni: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_owner_dni(dni)
    }

    pub fn set_owner_phone(&mut self, phone: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_owner_phone(phone)
    }

    /// Look the owner up by the current email. A failed lookup leaves the
    /// owner unverified, even if an earlier check succeeded.
    #[instrument(skip(self))]
    pub async fn check_owner(&mut self) -> Result<&OwnerExistence, WizardFlowError> {
        let email = self.wizard.owner_lookup_email()?;
        let found = match self.backend.lookup_owner(&self.token, &email).await {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "owner lookup failed");
                self.wizard.fail_owner_lookup(&email);
                return Err(WizardFlowError::Lookup(
                    lookup_failure_message(&err).to_string(),
                ));
            }
        };
        if self.wizard.apply_owner_lookup(&email, found) {
            debug!(existence = ?self.wizard.existence(), "owner lookup applied");
        }
        Ok(self.wizard.existence())
    }

    /// Create the owner if needed, then the pet.
    ///
    /// On success the drafts are discarded. On failure nothing is discarded
    /// and the same submission can be retried.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<PetSummary, WizardFlowError> {
        let plan = self.wizard.plan_submission()?;
        if let Some(owner) = &plan.owner {
            self.backend
                .create_owner(&self.token, owner)
                .await
                .map_err(|err| {
                    warn!(error = %err, "owner creation failed; pet not submitted");
                    WizardFlowError::Submit(err.message_or(SUBMISSION_FAILED))
                })?;
            info!(email = %owner.email, "owner created");
        }
        let pet = self
            .backend
            .create_pet(&self.token, &plan.pet)
            .await
            .map_err(|err| {
                warn!(error = %err, "pet creation failed");
                WizardFlowError::Submit(err.message_or(SUBMISSION_FAILED))
            })?;
        info!(name = %pet.name, "pet registered");
        self.wizard.cancel();
        Ok(pet)
    }

    /// Close the wizard, discarding every draft.
    pub fn close(mut self) {
        self.wizard.cancel();
        debug!("wizard closed");
    }
}
