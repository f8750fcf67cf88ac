//! Login, registration and activation against a scripted backend.

use vetdesk::auth::{self, ActivationStatus, ActivationView, LoginError};
use vetdesk::core::errors::FormField;
use vetdesk::core::forms::RegisterForm;
use vetdesk::core::routes::Route;
use vetdesk::core::types::{Credentials, LoginRole};
use vetdesk::io::session_storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
use vetdesk::session::SessionStore;
use vetdesk::test_support::{Call, Endpoint, ScriptedBackend, status, temp_session_storage};

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn register_form() -> RegisterForm {
    RegisterForm {
        username: "marta".to_string(),
        email: "marta@example.com".to_string(),
        password: "secreta".to_string(),
        phone: "600 123 456".to_string(),
        ..RegisterForm::default()
    }
}

#[tokio::test]
async fn vet_login_with_wrong_password_is_rejected() {
    let backend = ScriptedBackend::new().with_account(LoginRole::Vet, "vet1", "clave");
    let mut store = SessionStore::restore(MemorySessionStorage::default());

    let err = auth::login(&backend, &mut store, LoginRole::Vet, &credentials("vet1", "mala"))
        .await
        .expect_err("wrong password");

    assert_eq!(err, LoginError::Rejected("Credenciales inválidas"));
    assert!(!store.is_authenticated());
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn login_uses_the_role_endpoint() {
    let backend = ScriptedBackend::new().with_account(LoginRole::User, "ana", "clave");
    let mut store = SessionStore::restore(MemorySessionStorage::default());

    // Same credentials against the vet endpoint are unknown.
    auth::login(&backend, &mut store, LoginRole::Vet, &credentials("ana", "clave"))
        .await
        .expect_err("not a vet");
    let route = auth::login(&backend, &mut store, LoginRole::User, &credentials("ana", "clave"))
        .await
        .expect("user login");

    assert_eq!(route, Route::Home);
    assert_eq!(
        backend.calls(),
        vec![
            Call::Login {
                role: LoginRole::Vet,
                username: "ana".to_string()
            },
            Call::Login {
                role: LoginRole::User,
                username: "ana".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn service_failure_has_its_own_message() {
    let backend = ScriptedBackend::new().failing(Endpoint::Login, status(503, None));
    let mut store = SessionStore::restore(MemorySessionStorage::default());

    let err = auth::login(&backend, &mut store, LoginRole::User, &credentials("a", "b"))
        .await
        .expect_err("service down");
    assert_eq!(err.to_string(), "Error en el servicio de login");
}

#[tokio::test]
async fn login_survives_a_restart() {
    let backend = ScriptedBackend::new().with_account(LoginRole::Vet, "vet1", "clave");
    let (temp, storage) = temp_session_storage().expect("storage");
    let mut store = SessionStore::restore(storage);

    let route = auth::login(&backend, &mut store, LoginRole::Vet, &credentials("vet1", "clave"))
        .await
        .expect("login");
    assert_eq!(route, Route::Home);
    assert_eq!(store.gate(Route::AddPet), Route::AddPet);

    drop(store);
    let restored = SessionStore::restore(FileSessionStorage::new(&temp.path().join("session")));
    let session = restored.current().expect("restored session");
    assert_eq!(session.token, "token-vet1");
    assert_eq!(session.username(), "vet1");
}

#[tokio::test]
async fn register_logs_the_account_in() {
    let backend = ScriptedBackend::new();
    let mut store = SessionStore::restore(MemorySessionStorage::default());

    let route = auth::register(&backend, &mut store, &register_form())
        .await
        .expect("register");

    assert_eq!(route, Route::Home);
    assert_eq!(store.current().map(|s| s.username()), Some("marta"));
    assert!(store.storage().get("token").expect("get").is_some());
}

#[tokio::test]
async fn invalid_form_never_reaches_the_backend() {
    let backend = ScriptedBackend::new();
    let mut store = SessionStore::restore(MemorySessionStorage::default());
    let form = RegisterForm {
        username: "ab".to_string(),
        password: "123".to_string(),
        ..register_form()
    };

    let errors = auth::register(&backend, &mut store, &form)
        .await
        .expect_err("invalid");

    assert!(errors.get(FormField::Username).is_some());
    assert!(errors.get(FormField::Password).is_some());
    assert!(backend.calls().is_empty());
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn duplicate_email_maps_to_the_email_field() {
    let backend = ScriptedBackend::new().failing(
        Endpoint::Register,
        status(409, Some("Email already registered")),
    );
    let mut store = SessionStore::restore(MemorySessionStorage::default());

    let errors = auth::register(&backend, &mut store, &register_form())
        .await
        .expect_err("conflict");

    assert_eq!(errors.get(FormField::Email), Some("Este email ya está en uso"));
    assert_eq!(errors.get(FormField::Global), None);
}

#[tokio::test]
async fn activation_without_token_is_invalid_without_calls() {
    let backend = ScriptedBackend::new();

    let mut view = ActivationView::open(&backend, None).await;

    assert_eq!(view.status(), ActivationStatus::Invalid);
    assert!(view.error().is_some());
    assert!(view.submit(&backend, "secreta", "secreta").await.is_err());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn rejected_token_shows_the_fallback_message() {
    let backend = ScriptedBackend::new().failing(Endpoint::VerifyToken, status(400, None));

    let view = ActivationView::open(&backend, Some("abc")).await;

    assert_eq!(view.status(), ActivationStatus::Invalid);
    assert_eq!(view.error(), Some("Token no válido o expirado"));
}

#[tokio::test]
async fn activation_checks_passwords_before_submitting() {
    let backend = ScriptedBackend::new();
    let mut view = ActivationView::open(&backend, Some("abc")).await;
    assert_eq!(view.status(), ActivationStatus::Valid);

    let err = view
        .submit(&backend, "secreta", "otra")
        .await
        .expect_err("mismatch");
    assert_eq!(err, "Las contraseñas no coinciden.");
    assert_eq!(view.status(), ActivationStatus::Valid);

    view.submit(&backend, "secreta", "secreta")
        .await
        .expect("activate");
    assert_eq!(view.status(), ActivationStatus::Success);
    assert_eq!(
        backend.calls(),
        vec![
            Call::VerifyToken("abc".to_string()),
            Call::Activate("abc".to_string())
        ]
    );
}

#[tokio::test]
async fn failed_activation_can_be_retried() {
    let backend = ScriptedBackend::new().failing(Endpoint::Activate, status(500, None));
    let mut view = ActivationView::open(&backend, Some("abc")).await;

    let err = view
        .submit(&backend, "secreta", "secreta")
        .await
        .expect_err("server error");
    assert_eq!(err, "Error al activar la cuenta");
    assert_eq!(view.status(), ActivationStatus::Valid);
}
