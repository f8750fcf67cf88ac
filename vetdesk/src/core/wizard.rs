//! Two-step pet registration wizard as a pure state machine.
//!
//! Step 1 collects the pet, step 2 resolves its owner by email. The owner
//! lookup and the final submission are performed by the caller; this module
//! only decides what is allowed and what must be sent.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::cascade::{BreedCascade, BreedRefresh, CascadeError};
use crate::core::types::{
    Breed, NEW_OWNER_ROLE, NEW_OWNER_SURNAMES, NewOwner, NewPet, OwnerSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Pet,
    Owner,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::Pet => f.write_str("mascota"),
            WizardStep::Owner => f.write_str("propietario"),
        }
    }
}

/// Result of the owner email check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OwnerExistence {
    /// Not checked yet, or the email changed since the last check.
    #[default]
    Unknown,
    Found(OwnerSummary),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetField {
    Name,
    BirthDate,
    Species,
    Breed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    Name,
    Dni,
    Phone,
}

impl fmt::Display for PetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PetField::Name => "nombre",
            PetField::BirthDate => "fecha de nacimiento",
            PetField::Species => "especie",
            PetField::Breed => "raza",
        })
    }
}

impl fmt::Display for OwnerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OwnerField::Name => "nombre",
            OwnerField::Dni => "DNI",
            OwnerField::Phone => "teléfono",
        })
    }
}

fn join_fields<T: fmt::Display>(fields: &[T]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Transition rejected by the wizard. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Por favor, completa todos los campos obligatorios (*): {}", join_fields(.0))]
    MissingPetFields(Vec<PetField>),
    #[error("Ingresa un correo electrónico")]
    MissingEmail,
    #[error("Por favor, verifica el correo electrónico del usuario primero.")]
    OwnerNotVerified,
    #[error("Por favor, completa todos los datos del nuevo propietario: {}", join_fields(.0))]
    MissingOwnerFields(Vec<OwnerField>),
    #[error("no disponible en el paso de {0}")]
    WrongStep(WizardStep),
    #[error(transparent)]
    Breed(#[from] CascadeError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetDraft {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub allergies: String,
    pub diet_info: String,
    selection: BreedCascade,
}

impl PetDraft {
    pub fn species_id(&self) -> Option<i64> {
        self.selection.species_id()
    }

    pub fn breed_id(&self) -> Option<i64> {
        self.selection.breed_id()
    }

    pub fn breeds(&self) -> &[Breed] {
        self.selection.breeds()
    }

    fn missing_fields(&self) -> Vec<PetField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(PetField::Name);
        }
        if self.birth_date.is_none() {
            missing.push(PetField::BirthDate);
        }
        if self.species_id().is_none() {
            missing.push(PetField::Species);
        }
        if self.breed_id().is_none() {
            missing.push(PetField::Breed);
        }
        missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerDraft {
    pub email: String,
    pub name: String,
    pub dni: String,
    pub phone: String,
}

impl OwnerDraft {
    fn missing_fields(&self) -> Vec<OwnerField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(OwnerField::Name);
        }
        if self.dni.trim().is_empty() {
            missing.push(OwnerField::Dni);
        }
        if self.phone.trim().is_empty() {
            missing.push(OwnerField::Phone);
        }
        missing
    }
}

/// Calls to issue, in order, for an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPlan {
    /// Present when the owner must be created before the pet.
    pub owner: Option<NewOwner>,
    pub pet: NewPet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    step: WizardStep,
    pet: PetDraft,
    owner: OwnerDraft,
    existence: OwnerExistence,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Pet,
            pet: PetDraft::default(),
            owner: OwnerDraft::default(),
            existence: OwnerExistence::Unknown,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn pet(&self) -> &PetDraft {
        &self.pet
    }

    pub fn owner(&self) -> &OwnerDraft {
        &self.owner
    }

    pub fn existence(&self) -> &OwnerExistence {
        &self.existence
    }

    fn require_step(&self, step: WizardStep) -> Result<(), WizardError> {
        if self.step != step {
            return Err(WizardError::WrongStep(self.step));
        }
        Ok(())
    }

    pub fn set_pet_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.name = name.into();
        Ok(())
    }

    pub fn set_birth_date(&mut self, date: Option<NaiveDate>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.birth_date = date;
        Ok(())
    }

    pub fn set_weight(&mut self, weight: Option<f64>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.weight = weight;
        Ok(())
    }

    pub fn set_allergies(&mut self, allergies: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.allergies = allergies.into();
        Ok(())
    }

    pub fn set_diet_info(&mut self, diet_info: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.diet_info = diet_info.into();
        Ok(())
    }

    /// Change species; the breed selection is reset and the caller must
    /// refresh the breed list as instructed.
    pub fn select_species(&mut self, species_id: Option<i64>) -> Result<BreedRefresh, WizardError> {
        self.require_step(WizardStep::Pet)?;
        Ok(self.pet.selection.select_species(species_id))
    }

    /// Install breeds fetched for `species_id`. Stale lists are ignored.
    pub fn apply_breeds(&mut self, species_id: i64, breeds: Vec<Breed>) -> bool {
        self.pet.selection.apply_breeds(species_id, breeds)
    }

    pub fn select_breed(&mut self, breed_id: Option<i64>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        self.pet.selection.select_breed(breed_id)?;
        Ok(())
    }

    /// Move from the pet step to the owner step.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Pet)?;
        let missing = self.pet.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::MissingPetFields(missing));
        }
        self.step = WizardStep::Owner;
        Ok(())
    }

    /// Return to the pet step. Drafts and the existence result are kept.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Owner)?;
        self.step = WizardStep::Pet;
        Ok(())
    }

    /// Edit the owner email. A different value invalidates the last lookup.
    pub fn set_owner_email(&mut self, email: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Owner)?;
        let email = email.into();
        if email != self.owner.email {
            self.existence = OwnerExistence::Unknown;
            self.owner.email = email;
        }
        Ok(())
    }

    pub fn set_owner_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Owner)?;
        self.owner.name = name.into();
        Ok(())
    }

    pub fn set_owner_dni(&mut self, dni: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Owner)?;
        self.owner.dni = dni.into();
        Ok(())
    }

    pub fn set_owner_phone(&mut self, phone: impl Into<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Owner)?;
        self.owner.phone = phone.into();
        Ok(())
    }

    /// Email to look up. Rejects the check before any network call when the
    /// field is empty.
    pub fn owner_lookup_email(&self) -> Result<String, WizardError> {
        self.require_step(WizardStep::Owner)?;
        let email = self.owner.email.trim();
        if email.is_empty() {
            return Err(WizardError::MissingEmail);
        }
        Ok(email.to_string())
    }

    /// Record the lookup answer for `email`. Returns `false` when the email
    /// field has changed since the lookup started; the answer is dropped.
    pub fn apply_owner_lookup(&mut self, email: &str, found: Option<OwnerSummary>) -> bool {
        if self.step != WizardStep::Owner || self.owner.email.trim() != email {
            return false;
        }
        self.existence = match found {
            Some(owner) => {
                if let Some(name) = owner.name.as_deref().filter(|n| !n.trim().is_empty()) {
                    self.owner.name = name.to_string();
                }
                OwnerExistence::Found(owner)
            }
            None => OwnerExistence::NotFound,
        };
        true
    }

    /// Record a failed lookup for `email`: the owner counts as unverified
    /// again. Returns `false` when the email field has changed meanwhile.
    pub fn fail_owner_lookup(&mut self, email: &str) -> bool {
        if self.step != WizardStep::Owner || self.owner.email.trim() != email {
            return false;
        }
        self.existence = OwnerExistence::Unknown;
        true
    }

    /// Decide which calls a submission issues. No state changes.
    pub fn plan_submission(&self) -> Result<SubmissionPlan, WizardError> {
        self.require_step(WizardStep::Owner)?;
        let owner = match &self.existence {
            OwnerExistence::Unknown => return Err(WizardError::OwnerNotVerified),
            OwnerExistence::Found(_) => None,
            OwnerExistence::NotFound => {
                let missing = self.owner.missing_fields();
                if !missing.is_empty() {
                    return Err(WizardError::MissingOwnerFields(missing));
                }
                Some(NewOwner {
                    name: self.owner.name.trim().to_string(),
                    surnames: NEW_OWNER_SURNAMES.to_string(),
                    email: self.owner.email.trim().to_string(),
                    phone: self.owner.phone.trim().to_string(),
                    dni: self.owner.dni.trim().to_string(),
                    role: NEW_OWNER_ROLE.to_string(),
                })
            }
        };
        let pet = self.new_pet()?;
        Ok(SubmissionPlan { owner, pet })
    }

    fn new_pet(&self) -> Result<NewPet, WizardError> {
        let missing = self.pet.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::MissingPetFields(missing));
        }
        let (Some(birth_date), Some(specie_id), Some(breed_id)) =
            (self.pet.birth_date, self.pet.species_id(), self.pet.breed_id())
        else {
            return Err(WizardError::MissingPetFields(missing));
        };
        Ok(NewPet {
            name: self.pet.name.trim().to_string(),
            birth_date,
            specie_id,
            breed_id,
            weight: self.pet.weight.unwrap_or(0.0),
            diet_info: self.pet.diet_info.clone(),
            email: self.owner.email.trim().to_string(),
        })
    }

    /// Discard every draft and return to the pet step.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }
}
