// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider (Firebase Authentication REST API, with an in-memory
//! backend for tests).
//!
//! Handles:
//! - Account creation with email and password
//! - Password sign-in
//! - Mapping provider error codes onto our error taxonomy

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Minimum password length, checked before calling the provider.
const MIN_PASSWORD_LEN: usize = 6;

/// Firebase Authentication REST client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirebaseAuthClient {
    /// Create a new client (or point it at the emulator if
    /// FIREBASE_AUTH_EMULATOR_HOST is set).
    pub fn new(api_key: String) -> Self {
        let base_url = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            Err(_) => "https://identitytoolkit.googleapis.com/v1".to_string(),
        };

        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Create an account, returning the new uid.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, AppError> {
        self.account_call("accounts:signUp", email, password).await
    }

    /// Verify credentials, returning the account's uid.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, AppError> {
        self.account_call("accounts:signInWithPassword", email, password)
            .await
    }

    async fn account_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/{}?key={}", self.base_url, method, self.api_key);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Identity request failed: {}", e)))?;

        if !response.status().is_success() {
            let body: IdentityErrorBody = response.json().await.unwrap_or_default();
            return Err(map_identity_error(&body.error.message));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Identity response parse error: {}", e)))?;

        Ok(account.local_id)
    }
}

/// Successful signUp/signInWithPassword response (fields we use).
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "localId")]
    local_id: String,
}

/// Error envelope returned by the Identity Toolkit API.
#[derive(Debug, Default, Deserialize)]
struct IdentityErrorBody {
    #[serde(default)]
    error: IdentityError,
}

#[derive(Debug, Default, Deserialize)]
struct IdentityError {
    #[serde(default)]
    message: String,
}

/// Map an Identity Toolkit error code onto our error taxonomy.
///
/// Codes sometimes arrive with a trailing explanation
/// ("WEAK_PASSWORD : Password should be at least 6 characters"), so only the
/// first token is matched.
fn map_identity_error(message: &str) -> AppError {
    let code = message.split_whitespace().next().unwrap_or("");
    match code {
        "EMAIL_EXISTS" => {
            AppError::Validation("An account with this email already exists".to_string())
        }
        "INVALID_EMAIL" | "MISSING_EMAIL" => {
            AppError::Validation("A valid email address is required".to_string())
        }
        "WEAK_PASSWORD" => AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "MISSING_PASSWORD" => AppError::Unauthorized,
        _ => AppError::Transport(format!("Identity provider error: {}", message)),
    }
}

/// Stored credentials for the in-memory backend.
#[derive(Clone)]
pub struct MemoryAccount {
    uid: String,
    password_hash: String,
}

/// Identity provider handle, dispatching to Firebase or the in-memory backend.
#[derive(Clone)]
pub enum IdentityService {
    Firebase(FirebaseAuthClient),
    Memory {
        accounts: Arc<DashMap<String, MemoryAccount>>,
    },
}

impl IdentityService {
    /// Create a service backed by Firebase Authentication.
    pub fn new(api_key: String) -> Self {
        IdentityService::Firebase(FirebaseAuthClient::new(api_key))
    }

    /// Create an in-memory service for tests and offline development.
    pub fn in_memory() -> Self {
        IdentityService::Memory {
            accounts: Arc::new(DashMap::new()),
        }
    }

    /// Create an account and return its uid.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = normalize_email(email);
        validate_credentials(&email, password)?;

        match self {
            IdentityService::Firebase(client) => client.sign_up(&email, password).await,
            IdentityService::Memory { accounts } => {
                if accounts.contains_key(&email) {
                    return Err(AppError::Validation(
                        "An account with this email already exists".to_string(),
                    ));
                }
                let uid = uuid::Uuid::new_v4().simple().to_string();
                accounts.insert(
                    email,
                    MemoryAccount {
                        uid: uid.clone(),
                        password_hash: hash_password(password),
                    },
                );
                Ok(uid)
            }
        }
    }

    /// Verify credentials and return the account's uid.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        match self {
            IdentityService::Firebase(client) => client.sign_in(&email, password).await,
            IdentityService::Memory { accounts } => {
                let account = accounts.get(&email).ok_or(AppError::Unauthorized)?;
                if account.password_hash != hash_password(password) {
                    return Err(AppError::Unauthorized);
                }
                Ok(account.uid.clone())
            }
        }
    }
}

/// Emails are matched case-insensitively by the provider.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reject obviously malformed credentials before calling the provider.
fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid_email {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(())
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in_returns_same_uid() {
        let identity = IdentityService::in_memory();
        let uid = identity
            .sign_up("Amy@Example.COM ", "hunter22")
            .await
            .unwrap();

        let again = identity
            .sign_in("amy@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(uid, again);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let identity = IdentityService::in_memory();
        identity
            .sign_up("amy@example.com", "hunter22")
            .await
            .unwrap();

        let err = identity
            .sign_up("amy@example.com", "different8")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let identity = IdentityService::in_memory();
        identity
            .sign_up("amy@example.com", "hunter22")
            .await
            .unwrap();

        let err = identity
            .sign_in("amy@example.com", "wrong-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let err = identity
            .sign_in("nobody@example.com", "hunter22")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_short_password_and_bad_email_are_validation_errors() {
        let identity = IdentityService::in_memory();

        let err = identity.sign_up("amy@example.com", "abc").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = identity.sign_up("not-an-email", "hunter22").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_identity_error_mapping() {
        assert!(matches!(
            map_identity_error("EMAIL_EXISTS"),
            AppError::Validation(_)
        ));
        assert!(matches!(
            map_identity_error("INVALID_LOGIN_CREDENTIALS"),
            AppError::Unauthorized
        ));
        assert!(matches!(
            map_identity_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            AppError::Validation(_)
        ));
        assert!(matches!(
            map_identity_error("QUOTA_EXCEEDED"),
            AppError::Transport(_)
        ));
    }
}
