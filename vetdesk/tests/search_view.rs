//! Pet search screen against a scripted backend.

use vetdesk::core::types::PetFilter;
use vetdesk::search::{INITIAL_LOAD_FAILED, SEARCH_FAILED, SearchView};
use vetdesk::test_support::{Call, Endpoint, catalog_backend, pet_summary, status};

fn searches(calls: &[Call]) -> Vec<PetFilter> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::SearchPets { filter, .. } => Some(filter.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn mount_loads_species_and_all_pets() {
    let backend = catalog_backend().with_pets(vec![pet_summary(1, "Luna"), pet_summary(2, "Toby")]);

    let view = SearchView::mount(&backend, Some("tok")).await;

    assert_eq!(view.species().len(), 2);
    assert_eq!(view.results().len(), 2);
    assert_eq!(view.error(), None);
    assert!(!view.breed_selector_enabled());
    assert!(backend.calls().contains(&Call::SearchPets {
        token: Some("tok".to_string()),
        filter: PetFilter::default(),
    }));
}

#[tokio::test]
async fn mount_failure_sets_a_single_error() {
    let backend = catalog_backend().failing(Endpoint::SearchPets, status(500, None));

    let view = SearchView::mount(&backend, None).await;

    assert_eq!(view.error(), Some(INITIAL_LOAD_FAILED));
    assert!(view.results().is_empty());
}

#[tokio::test]
async fn editing_filters_does_not_search() {
    let backend = catalog_backend().with_pets(vec![pet_summary(1, "Luna")]);
    let mut view = SearchView::mount(&backend, None).await;

    view.set_name("lu");
    view.select_species(Some(1)).await;
    view.select_breed(Some(10)).expect("beagle");

    assert_eq!(searches(&backend.calls()).len(), 1);
    assert_eq!(
        view.filter(),
        PetFilter {
            name: Some("lu".to_string()),
            species_id: Some(1),
            breed_id: Some(10),
        }
    );
}

#[tokio::test]
async fn search_sends_the_current_filters() {
    let backend = catalog_backend().with_pets(vec![pet_summary(1, "Luna"), pet_summary(2, "Toby")]);
    let mut view = SearchView::mount(&backend, Some("tok")).await;

    view.set_name("lu");
    let found: Vec<String> = view
        .search()
        .await
        .expect("search")
        .iter()
        .map(|pet| pet.name.clone())
        .collect();

    assert_eq!(found, vec!["Luna".to_string()]);
    let sent = searches(&backend.calls());
    assert_eq!(sent.last().and_then(|f| f.name.as_deref()), Some("lu"));
}

#[tokio::test]
async fn changing_species_clears_the_breed_filter() {
    let backend = catalog_backend();
    let mut view = SearchView::mount(&backend, None).await;

    view.select_species(Some(1)).await;
    view.select_breed(Some(11)).expect("boxer");
    view.select_species(Some(2)).await;

    assert_eq!(view.filter().breed_id, None);
    assert_eq!(view.breeds().len(), 2);
    assert!(view.select_breed(Some(11)).is_err());

    view.select_species(None).await;
    assert!(!view.breed_selector_enabled());
    assert!(view.breeds().is_empty());
}

#[tokio::test]
async fn blank_name_is_not_a_filter() {
    let backend = catalog_backend();
    let mut view = SearchView::mount(&backend, None).await;

    view.set_name("   ");

    assert_eq!(view.filter(), PetFilter::default());
}

#[tokio::test]
async fn breed_failure_only_empties_the_selector() {
    let backend = catalog_backend()
        .with_pets(vec![pet_summary(1, "Luna")])
        .failing(Endpoint::Breeds, status(500, None));
    let mut view = SearchView::mount(&backend, None).await;

    view.select_species(Some(1)).await;

    assert!(view.breeds().is_empty());
    assert_eq!(view.filter().species_id, Some(1));
    assert_eq!(view.error(), None);
    assert_eq!(view.results().len(), 1);
}

#[tokio::test]
async fn failed_search_reports_an_error() {
    let backend = catalog_backend().failing(Endpoint::SearchPets, status(502, None));
    let mut view = SearchView::mount(&backend, None).await;

    let err = view.search().await.expect_err("search fails");

    assert_eq!(err, SEARCH_FAILED);
    assert_eq!(view.error(), Some(SEARCH_FAILED));
}

#[tokio::test]
async fn failed_search_keeps_previous_results() {
    let backend = catalog_backend()
        .with_pets(vec![pet_summary(1, "Luna")])
        .failing_after(Endpoint::SearchPets, 1, status(502, None));
    let mut view = SearchView::mount(&backend, None).await;
    assert_eq!(view.results().len(), 1);

    view.set_name("toby");
    view.search().await.expect_err("second search fails");

    assert_eq!(view.results().len(), 1);
    assert_eq!(view.results()[0].name, "Luna");
}

#[tokio::test]
async fn open_loads_species_only() {
    let backend = catalog_backend().with_pets(vec![pet_summary(1, "Luna"), pet_summary(2, "Toby")]);
    let mut view = SearchView::open(&backend, Some("tok")).await;

    assert_eq!(view.species().len(), 2);
    assert!(view.results().is_empty());
    assert!(searches(&backend.calls()).is_empty());

    view.set_name("toby");
    view.search().await.expect("search");

    let sent = searches(&backend.calls());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name.as_deref(), Some("toby"));
    assert_eq!(view.results().len(), 1);
}

#[tokio::test]
async fn open_reports_species_failure() {
    let backend = catalog_backend().failing(Endpoint::Species, status(500, None));

    let view = SearchView::open(&backend, None).await;

    assert_eq!(view.error(), Some(INITIAL_LOAD_FAILED));
    assert!(view.species().is_empty());
}
