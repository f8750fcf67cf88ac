//! [`Backend`] implementation over HTTP with `reqwest`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::core::errors::ApiError;
use crate::core::forms::RegisterForm;
use crate::core::types::{
    ActivationRequest, AuthResponse, Breed, Credentials, LoginRole, NewOwner, NewPet,
    OwnerSummary, PetFilter, PetSummary, Species, UserIdentity,
};
use crate::io::backend::Backend;
use crate::io::config::ClientConfig;

/// Error body shapes the backend uses (`message` from the API, `error` from
/// the gateway).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A list endpoint answers either with a bare array or a page object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Items(Vec<T>),
    Page { content: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Items(items) | ListBody::Page { content: items } => items,
        }
    }
}

/// Answers of `GET /users/check-email`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwnerLookupBody {
    Users(ListBody<UserIdentity>),
    Exists { exist: bool },
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let client = builder.build().context("build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request` and return the raw body of a success response.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            let message = parsed.message.or(parsed.error);
            warn!(status = status.as_u16(), message = ?message, "backend returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        debug!(status = status.as_u16(), bytes = body.len(), "backend call succeeded");
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip_all, fields(role = %role, username = %credentials.username))]
    async fn login(
        &self,
        role: LoginRole,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.url(&format!("/auth/login/{}", role.as_str()));
        self.send_json(self.client.post(url).json(credentials)).await
    }

    #[instrument(skip_all, fields(username = %form.username))]
    async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ApiError> {
        self.send_json(self.client.post(self.url("/auth/register")).json(form))
            .await
    }

    #[instrument(skip_all)]
    async fn verify_activation_token(&self, token: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .get(self.url("/auth/verify"))
            .query(&[("token", token)]);
        self.send(request).await.map(|_| ())
    }

    #[instrument(skip_all)]
    async fn activate_account(&self, request: &ActivationRequest) -> Result<(), ApiError> {
        self.send(self.client.post(self.url("/auth/activate")).json(request))
            .await
            .map(|_| ())
    }

    #[instrument(skip_all)]
    async fn list_species(&self) -> Result<Vec<Species>, ApiError> {
        let body: ListBody<Species> = self.send_json(self.client.get(self.url("/species"))).await?;
        Ok(body.into_vec())
    }

    #[instrument(skip(self))]
    async fn list_breeds(&self, species_id: i64) -> Result<Vec<Breed>, ApiError> {
        let request = self
            .client
            .get(self.url("/breeds"))
            .query(&[("specie_id", species_id)]);
        let body: ListBody<Breed> = self.send_json(request).await?;
        Ok(body.into_vec())
    }

    #[instrument(skip(self, token))]
    async fn search_pets(
        &self,
        token: Option<&str>,
        filter: &PetFilter,
    ) -> Result<Vec<PetSummary>, ApiError> {
        let request = self
            .client
            .get(self.url("/pets"))
            .query(&filter.query_pairs());
        let body: ListBody<PetSummary> = self.send_json(Self::authorized(request, token)).await?;
        Ok(body.into_vec())
    }

    #[instrument(skip(self, token))]
    async fn lookup_owner(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Option<OwnerSummary>, ApiError> {
        let request = self
            .client
            .get(self.url("/users/check-email"))
            .query(&[("email", email)]);
        let body: OwnerLookupBody = self.send_json(Self::authorized(request, Some(token))).await?;
        let owner = match body {
            OwnerLookupBody::Users(users) => users.into_vec().into_iter().next().map(|user| {
                OwnerSummary {
                    email: user.email.clone().unwrap_or_else(|| email.to_string()),
                    name: user.username.or(user.name),
                }
            }),
            OwnerLookupBody::Exists { exist: true } => Some(OwnerSummary {
                email: email.to_string(),
                name: None,
            }),
            OwnerLookupBody::Exists { exist: false } => None,
        };
        debug!(found = owner.is_some(), "owner lookup resolved");
        Ok(owner)
    }

    #[instrument(skip_all, fields(email = %owner.email))]
    async fn create_owner(&self, token: &str, owner: &NewOwner) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/auth/register/user")).json(owner);
        self.send(Self::authorized(request, Some(token)))
            .await
            .map(|_| ())
    }

    #[instrument(skip_all, fields(name = %pet.name, email = %pet.email))]
    async fn create_pet(&self, token: &str, pet: &NewPet) -> Result<PetSummary, ApiError> {
        let request = self.client.post(self.url("/pets")).json(pet);
        self.send_json(Self::authorized(request, Some(token))).await
    }
}
