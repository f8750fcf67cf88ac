//! Species → breed cascading selection shared by the wizard and the search view.
//!
//! Invariant: the selected breed is either empty or one of the breeds loaded
//! for the currently selected species.

use thiserror::Error;

use crate::core::types::Breed;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error("selecciona una especie antes de elegir raza")]
    NoSpecies,
    #[error("la raza {0} no pertenece a la especie seleccionada")]
    UnknownBreed(i64),
}

/// What the caller must do with the breed list after a species change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedRefresh {
    /// Fetch breeds for this species and hand them to [`BreedCascade::apply_breeds`].
    Fetch(i64),
    /// Species was emptied; the breed list is already cleared.
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreedCascade {
    species_id: Option<i64>,
    breed_id: Option<i64>,
    breeds: Vec<Breed>,
}

impl BreedCascade {
    pub fn species_id(&self) -> Option<i64> {
        self.species_id
    }

    pub fn breed_id(&self) -> Option<i64> {
        self.breed_id
    }

    pub fn breeds(&self) -> &[Breed] {
        &self.breeds
    }

    /// Breed selector is disabled while no species is selected.
    pub fn breed_selector_enabled(&self) -> bool {
        self.species_id.is_some()
    }

    /// Change species. Always drops the breed selection and the loaded list.
    pub fn select_species(&mut self, species_id: Option<i64>) -> BreedRefresh {
        self.species_id = species_id;
        self.breed_id = None;
        self.breeds.clear();
        match species_id {
            Some(id) => BreedRefresh::Fetch(id),
            None => BreedRefresh::Cleared,
        }
    }

    /// Install a fetched breed list. Returns `false` (and changes nothing) when
    /// the list belongs to a species that is no longer selected.
    pub fn apply_breeds(&mut self, species_id: i64, breeds: Vec<Breed>) -> bool {
        if self.species_id != Some(species_id) {
            return false;
        }
        self.breeds = breeds;
        true
    }

    pub fn select_breed(&mut self, breed_id: Option<i64>) -> Result<(), CascadeError> {
        let Some(id) = breed_id else {
            self.breed_id = None;
            return Ok(());
        };
        if self.species_id.is_none() {
            return Err(CascadeError::NoSpecies);
        }
        if !self.breeds.iter().any(|breed| breed.id == id) {
            return Err(CascadeError::UnknownBreed(id));
        }
        self.breed_id = Some(id);
        Ok(())
    }
}
