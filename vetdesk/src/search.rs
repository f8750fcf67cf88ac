//! Pet search screen: filters, cascading selectors and explicit search.

use tracing::{debug, instrument, warn};

use crate::core::cascade::{BreedCascade, BreedRefresh, CascadeError};
use crate::core::types::{Breed, PetFilter, PetSummary, Species};
use crate::io::backend::Backend;

pub const INITIAL_LOAD_FAILED: &str = "Error al cargar datos iniciales";
pub const SEARCH_FAILED: &str = "Error en la búsqueda";

/// Filter state is edited freely; results only change on [`SearchView::search`].
pub struct SearchView<'a, B: Backend + ?Sized> {
    backend: &'a B,
    token: Option<String>,
    name: String,
    selection: BreedCascade,
    species: Vec<Species>,
    results: Vec<PetSummary>,
    error: Option<String>,
}

impl<'a, B: Backend + ?Sized> SearchView<'a, B> {
    fn empty(backend: &'a B, token: Option<&str>) -> Self {
        Self {
            backend,
            token: token.map(str::to_string),
            name: String::new(),
            selection: BreedCascade::default(),
            species: Vec::new(),
            results: Vec::new(),
            error: None,
        }
    }

    /// Load the species list and the unfiltered pet list together.
    #[instrument(skip_all)]
    pub async fn mount(backend: &'a B, token: Option<&str>) -> Self {
        let mut view = Self::empty(backend, token);
        let unfiltered = PetFilter::default();
        let (species, pets) = tokio::join!(
            backend.list_species(),
            backend.search_pets(token, &unfiltered)
        );
        match (species, pets) {
            (Ok(species), Ok(pets)) => {
                debug!(species = species.len(), pets = pets.len(), "search view mounted");
                view.species = species;
                view.results = pets;
            }
            (species, pets) => {
                if let Some(err) = species.as_ref().err().or(pets.as_ref().err()) {
                    warn!(error = %err, "initial search data failed");
                }
                view.error = Some(INITIAL_LOAD_FAILED.to_string());
            }
        }
        view
    }

    /// Load only the species list; results stay empty until the first
    /// [`SearchView::search`]. For one-shot filtered searches.
    #[instrument(skip_all)]
    pub async fn open(backend: &'a B, token: Option<&str>) -> Self {
        let mut view = Self::empty(backend, token);
        match backend.list_species().await {
            Ok(species) => view.species = species,
            Err(err) => {
                warn!(error = %err, "species fetch failed");
                view.error = Some(INITIAL_LOAD_FAILED.to_string());
            }
        }
        view
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Change the species filter and reload its breeds. Breed failures leave
    /// the breed selector empty.
    #[instrument(skip(self))]
    pub async fn select_species(&mut self, species_id: Option<i64>) {
        let BreedRefresh::Fetch(id) = self.selection.select_species(species_id) else {
            return;
        };
        match self.backend.list_breeds(id).await {
            Ok(breeds) => {
                self.selection.apply_breeds(id, breeds);
            }
            Err(err) => warn!(species_id = id, error = %err, "breed fetch failed"),
        }
    }

    pub fn select_breed(&mut self, breed_id: Option<i64>) -> Result<(), CascadeError> {
        self.selection.select_breed(breed_id)
    }

    pub fn filter(&self) -> PetFilter {
        PetFilter {
            name: Some(self.name.clone()).filter(|name| !name.trim().is_empty()),
            species_id: self.selection.species_id(),
            breed_id: self.selection.breed_id(),
        }
    }

    /// Run the search with the current filters. Previous results are kept
    /// when the search fails.
    #[instrument(skip(self))]
    pub async fn search(&mut self) -> Result<&[PetSummary], String> {
        self.error = None;
        let filter = self.filter();
        match self.backend.search_pets(self.token.as_deref(), &filter).await {
            Ok(pets) => {
                debug!(count = pets.len(), "search completed");
                self.results = pets;
                Ok(&self.results)
            }
            Err(err) => {
                warn!(error = %err, "search failed");
                self.error = Some(SEARCH_FAILED.to_string());
                Err(SEARCH_FAILED.to_string())
            }
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn breeds(&self) -> &[Breed] {
        self.selection.breeds()
    }

    pub fn breed_selector_enabled(&self) -> bool {
        self.selection.breed_selector_enabled()
    }

    pub fn results(&self) -> &[PetSummary] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
