//! Login, registration and logout against `/auth/*`, persisting the
//! returned session through the configured [`SessionStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::contract::SessionStore;
use crate::error::Result;
use crate::http::ApiClient;
use crate::session::{Session, UserRecord};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: UserRecord,
}

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl AuthApi {
    pub fn new(client: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { client, store }
    }

    /// Sign in and persist the returned token + user record.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response: AuthResponse = self
            .client
            .post_json("/auth/login", &LoginRequest { email, password })
            .await?;
        let session = Session {
            token: response.token,
            user: response.user,
        };
        info!(user = %session.user.email, "Signed in");
        self.store.save(session.clone());
        Ok(session)
    }

    /// Create an account; the backend signs the new user straight in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let response: AuthResponse = self
            .client
            .post_json(
                "/auth/register",
                &RegisterRequest {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        let session = Session {
            token: response.token,
            user: response.user,
        };
        info!(user = %session.user.email, "Registered and signed in");
        self.store.save(session.clone());
        Ok(session)
    }

    pub fn logout(&self) {
        info!("Signing out, clearing persisted session");
        self.store.clear();
    }
}
