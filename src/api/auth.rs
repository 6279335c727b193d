use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, Target, from_normalized};
use crate::errors::ApiError;
use crate::models::User;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// Sign-in and account endpoints under `/auth`.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a token and establish the session.
    ///
    /// Succeeds only for active admin accounts; anything else leaves the
    /// session signed out.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = self
            .api
            .anonymous(Method::POST, &self.api.url("/auth/login"))
            .json(&Credentials {
                email: email.trim(),
                password,
            });
        let target = Target {
            resource: "Login",
            id: None,
            authenticated: false,
        };
        let response = self.api.dispatch(request, target).await?;
        let value = ApiClient::decode_value(response, "login").await?;
        let LoginResponse { access_token, user } = from_normalized(value, "login")?;

        self.api.session().establish(access_token, user.clone())?;
        tracing::info!(email = %user.email, role = %user.role, "Signed in");
        Ok(user)
    }

    pub fn logout(&self) {
        self.api.session().teardown();
        tracing::info!("Signed out");
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .api
            .authorized(Method::PATCH, &self.api.url("/auth/change-password"))?
            .json(&PasswordChange {
                current_password,
                new_password,
            });
        self.api
            .dispatch(request, Target::collection("Password"))
            .await?;
        Ok(())
    }
}
