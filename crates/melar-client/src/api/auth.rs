//! Authentication and account endpoints (`/auth/*`, `/profiles/*`).

use melar_core::forms::{LoginPayload, PasswordChangeForm, ProfileUpdate, RegistrationForm};
use melar_core::{User, UserProfile};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: Option<String>,
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        AuthApi { client }
    }

    /// `POST /auth/login/`. Returns the session key; does not store it.
    pub async fn login(&self, payload: &LoginPayload) -> ClientResult<String> {
        let response: KeyResponse = self.client.post("/auth/login/", payload).await?;
        response.key.ok_or_else(|| ClientError::Decode {
            path: "/auth/login/".to_string(),
            reason: "missing key".to_string(),
        })
    }

    /// `POST /auth/registration/`. Returns the session key when the backend
    /// logs the new account in directly.
    pub async fn register(&self, form: &RegistrationForm) -> ClientResult<Option<String>> {
        let response: Option<KeyResponse> = self
            .client
            .send(reqwest::Method::POST, "/auth/registration/", &[], Some(form))
            .await?;
        info!(username = %form.username, "Account registered");
        Ok(response.and_then(|r| r.key))
    }

    /// `POST /auth/logout/`
    pub async fn logout(&self) -> ClientResult<()> {
        self.client.post_no_content("/auth/logout/", &json!({})).await
    }

    /// `GET /auth/user/`
    pub async fn current_user(&self) -> ClientResult<User> {
        self.client.require_token().await?;
        self.client.get("/auth/user/").await
    }

    /// `PATCH /auth/user/`
    pub async fn update_user(&self, update: &ProfileUpdate) -> ClientResult<User> {
        self.client.require_token().await?;
        self.client.patch("/auth/user/", update).await
    }

    /// `POST /auth/password/change/`
    pub async fn change_password(&self, form: &PasswordChangeForm) -> ClientResult<()> {
        self.client.require_token().await?;
        self.client
            .post_no_content("/auth/password/change/", form)
            .await
    }

    /// `GET /profiles/{id}/`
    pub async fn profile(&self, profile_id: &str) -> ClientResult<UserProfile> {
        self.client
            .get(&format!("/profiles/{}/", profile_id))
            .await
    }

    /// The caller's own profile (`GET /profiles/`, filtered server-side).
    pub async fn my_profile(&self) -> ClientResult<Option<UserProfile>> {
        self.client.require_token().await?;
        let profiles: Vec<UserProfile> = self.client.get_list("/profiles/", &[]).await?;
        Ok(profiles.into_iter().next())
    }
}
