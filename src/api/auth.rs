//! Account endpoints

use log::{info, warn};
use reqwest::Method;
use uuid::Uuid;

use super::types::{AuthSession, LoginRequest, LoginResponse, ProfileResponse, ProfileUpdate, RegisterRequest, RegisterResponse};
use super::{RequestMode, SommelierClient};
use crate::error::Result;
use crate::storage::{keys, set_json};

impl SommelierClient {
    /// Create an account
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.request(Method::POST, "/auth/register", Some(request), RequestMode::Immediate)
            .await
    }

    /// Sign in and remember the returned token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession> {
        let response: LoginResponse = self
            .request(Method::POST, "/auth/login", Some(request), RequestMode::Immediate)
            .await?;

        if let Some(token) = &response.token {
            if let Err(e) = set_json(self.store.as_ref(), keys::AUTH_TOKEN, token).await {
                warn!("Failed to store {}: {}", keys::AUTH_TOKEN, e);
            }
        }

        let user = response.user.into_auth_user(
            &request.email,
            || Uuid::new_v4().to_string(),
            response.token.clone(),
        );
        info!("Signed in as {}", user.id);

        Ok(AuthSession {
            token: response.token,
            user,
        })
    }

    /// Save the profile-setup form
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileResponse> {
        self.request(Method::PUT, "/auth/profile", Some(update), RequestMode::Immediate)
            .await
    }

    /// Forget the stored token. The backend keeps no session to end.
    pub async fn logout(&self) {
        if let Err(e) = self.store.remove_item(keys::AUTH_TOKEN).await {
            warn!("Failed to remove {}: {}", keys::AUTH_TOKEN, e);
        }
    }
}
