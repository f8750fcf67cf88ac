//! Login, registration and account activation screens.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::errors::{
    ACTIVATION_FAILED, FormErrors, TOKEN_INVALID, login_failure_message, register_failure,
};
use crate::core::forms::{RegisterForm, check_new_password};
use crate::core::routes::Route;
use crate::core::types::{ActivationRequest, Credentials, LoginRole};
use crate::io::backend::Backend;
use crate::io::session_storage::SessionStorage;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Backend refused the login; carries the message for the form.
    #[error("{0}")]
    Rejected(&'static str),
    #[error("no se pudo guardar la sesión: {0}")]
    Persist(String),
}

/// Log in against the endpoint for `role` and establish the session.
///
/// Returns the route to navigate to.
#[instrument(skip_all, fields(role = %role, username = %credentials.username))]
pub async fn login<B, S>(
    backend: &B,
    store: &mut SessionStore<S>,
    role: LoginRole,
    credentials: &Credentials,
) -> Result<Route, LoginError>
where
    B: Backend + ?Sized,
    S: SessionStorage,
{
    let auth = backend.login(role, credentials).await.map_err(|err| {
        warn!(error = %err, "login failed");
        LoginError::Rejected(login_failure_message(&err))
    })?;
    store
        .login(auth)
        .map_err(|err| LoginError::Persist(format!("{:#}", err)))?;
    Ok(Route::Home)
}

/// Register an account and log it in.
///
/// Local validation runs first; server rejections are mapped onto fields.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register<B, S>(
    backend: &B,
    store: &mut SessionStore<S>,
    form: &RegisterForm,
) -> Result<Route, FormErrors>
where
    B: Backend + ?Sized,
    S: SessionStorage,
{
    form.validate()?;
    let auth = backend.register(form).await.map_err(|err| {
        warn!(error = %err, "registration failed");
        register_failure(&err)
    })?;
    store
        .login(auth)
        .map_err(|err| FormErrors::global(format!("no se pudo guardar la sesión: {:#}", err)))?;
    info!("account registered");
    Ok(Route::Home)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Verifying,
    /// Token rejected or missing; no password can be set.
    Invalid,
    /// Token accepted; waiting for the new password.
    Valid,
    Submitting,
    Success,
}

/// Account activation screen reached from the emailed link.
#[derive(Debug, Clone)]
pub struct ActivationView {
    token: Option<String>,
    status: ActivationStatus,
    error: Option<String>,
}

impl ActivationView {
    /// Verify the token from the link. Missing tokens are rejected locally.
    pub async fn open<B: Backend + ?Sized>(backend: &B, token: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let mut view = Self {
            token: token.map(str::to_string),
            status: ActivationStatus::Verifying,
            error: None,
        };
        let Some(token) = token else {
            view.status = ActivationStatus::Invalid;
            view.error = Some("No se ha proporcionado ningún token de activación.".to_string());
            return view;
        };
        match backend.verify_activation_token(token).await {
            Ok(()) => {
                debug!("activation token accepted");
                view.status = ActivationStatus::Valid;
            }
            Err(err) => {
                warn!(error = %err, "activation token rejected");
                view.status = ActivationStatus::Invalid;
                view.error = Some(err.message_or(TOKEN_INVALID));
            }
        }
        view
    }

    pub fn status(&self) -> ActivationStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set the account password. Only allowed once the token is valid.
    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), String> {
        let token = match (&self.status, &self.token) {
            (ActivationStatus::Valid, Some(token)) => token.clone(),
            _ => {
                return Err(self
                    .error
                    .clone()
                    .unwrap_or_else(|| "El enlace de activación no es válido.".to_string()));
            }
        };
        if let Err(message) = check_new_password(new_password, confirm_password) {
            self.error = Some(message.to_string());
            return Err(message.to_string());
        }
        self.error = None;
        self.status = ActivationStatus::Submitting;
        let request = ActivationRequest {
            token,
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        match backend.activate_account(&request).await {
            Ok(()) => {
                info!("account activated");
                self.status = ActivationStatus::Success;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "activation failed");
                let message = err.message_or(ACTIVATION_FAILED);
                self.status = ActivationStatus::Valid;
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }
}
