use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use styragon_core::error::AppError;
use styragon_core::session::Session;
use styragon_core::traits::AuthProvider;
use tracing::{info, warn};

use crate::backend::{strip_status, BackendClient};

/// Password-based admin authentication against the backend's auth service.
#[derive(Clone)]
pub struct AuthClient {
    backend: BackendClient,
    /// Where the recovery email should send the admin back to.
    redirect_to: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

/// Response of the password grant.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    /// Unix seconds.
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Deserialize, Debug)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user_id: self.user.id,
            email: self.user.email,
            expires_at,
        }
    }
}

impl AuthClient {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            redirect_to: None,
        }
    }

    /// Sets the page the password-recovery link points to.
    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }
}

impl AuthProvider for AuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let mut url = self.backend.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .backend
            .anon_request(Method::POST, url)
            .json(&PasswordGrant { email, password });

        let response = self.backend.send(request).await.map_err(|e| match e {
            AppError::ClientError(_) => AppError::AuthError(strip_status(e)),
            other => other,
        })?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ClientError(format!("Failed to parse response: {}", e)))?;

        Ok(token.into_session(Utc::now()))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AppError> {
        let url = self.backend.endpoint("auth/v1/logout")?;
        let request = self
            .backend
            .request(Method::POST, url)
            .bearer_auth(&session.access_token);

        if let Err(e) = self.backend.send(request).await {
            warn!(user_id = %session.user_id, error = %e, "remote sign-out failed");
            return Err(e);
        }
        Ok(())
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<(), AppError> {
        let url = self.backend.endpoint("auth/v1/user")?;
        let request = self
            .backend
            .request(Method::PUT, url)
            .bearer_auth(&session.access_token)
            .json(&PasswordUpdate {
                password: new_password,
            });

        self.backend.send(request).await.map_err(|e| match e {
            AppError::ClientError(_) => AppError::AuthError(strip_status(e)),
            other => other,
        })?;

        info!(user_id = %session.user_id, "password updated");
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let mut url = self.backend.endpoint("auth/v1/recover")?;
        if let Some(redirect_to) = &self.redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        }

        let request = self
            .backend
            .anon_request(Method::POST, url)
            .json(&RecoverRequest { email });

        self.backend.send(request).await?;
        Ok(())
    }
}
