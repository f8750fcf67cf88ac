//! Authenticated session model and its persisted form.
//!
//! The session is persisted under two keys: the raw token and the user
//! identity as JSON. Decoding is strict; the store decides what to do with
//! undecodable state.

use anyhow::{Context, Result};

use crate::core::types::{AuthResponse, UserIdentity};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserIdentity,
}

impl Session {
    pub fn from_auth(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            user: auth.user,
        }
    }

    pub fn username(&self) -> &str {
        self.user.display_name().unwrap_or("desconocido")
    }

    pub fn role(&self) -> Option<&str> {
        self.user.role.as_deref()
    }

    /// Values to persist, keyed by storage key.
    pub fn encode(&self) -> Result<[(&'static str, String); 2]> {
        let user = serde_json::to_string(&self.user).context("serialize session user")?;
        Ok([(TOKEN_KEY, self.token.clone()), (USER_KEY, user)])
    }

    /// Rebuild a session from persisted values.
    pub fn decode(token: &str, user_json: &str) -> Result<Self> {
        if token.trim().is_empty() {
            anyhow::bail!("persisted token is empty");
        }
        let user: UserIdentity =
            serde_json::from_str(user_json).context("parse persisted session user")?;
        Ok(Self {
            token: token.to_string(),
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_keeps_identity() {
        let session = Session {
            token: "jwt".to_string(),
            user: UserIdentity {
                username: Some("vet1".to_string()),
                role: Some("VET".to_string()),
                ..UserIdentity::default()
            },
        };
        let [(token_key, token), (user_key, user)] = session.encode().expect("encode");
        assert_eq!((token_key, user_key), (TOKEN_KEY, USER_KEY));
        let decoded = Session::decode(&token, &user).expect("decode");
        assert_eq!(decoded, session);
        assert_eq!(decoded.username(), "vet1");
        assert_eq!(decoded.role(), Some("VET"));
    }

    #[test]
    fn decode_rejects_corrupted_user() {
        assert!(Session::decode("jwt", "{not json").is_err());
        assert!(Session::decode("jwt", "42").is_err());
        assert!(Session::decode("", "{}").is_err());
    }
}
