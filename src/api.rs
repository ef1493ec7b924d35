//! HTTP access to the Expense Tracker backend.
//!
//! Everything status-code-shaped is handled centrally here: bearer token
//! injection, the 401/403 forced-logout signal, the backend's error-body
//! shape, and the field-name aliases some server versions use in auth
//! responses. Callers only ever see typed models or a `PennyError`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PennyError, Result};
use crate::models::{Budget, Transaction};
use crate::session::Session;
use crate::settings::Settings;

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub full_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Auth response as served by the backend. Older server versions send
/// `token` for `accessToken` and `enable` for `enabled`; both spellings
/// are accepted here and nowhere else.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default, alias = "token")]
    access_token: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, alias = "enable")]
    enabled: Option<bool>,
}

impl AuthPayload {
    /// Normalize into the canonical session record, rejecting incomplete
    /// payloads so a partial response never becomes a partial session.
    pub fn into_session(self) -> Result<Session> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| invalid_response("missing token"))?;
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| invalid_response("missing username"))?;
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| invalid_response("missing email"))?;
        let enabled = self
            .enabled
            .ok_or_else(|| invalid_response("missing enabled status"))?;
        Ok(Session {
            access_token,
            username,
            email,
            enabled,
        })
    }
}

fn invalid_response(what: &str) -> PennyError {
    PennyError::Other(format!("Invalid response from server: {what}"))
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, String>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &Settings, token: Option<String>) -> Result<Self> {
        Self::new(&settings.api_base_url, settings.timeout_secs, token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    async fn execute(&self, rb: RequestBuilder) -> Result<Response> {
        let resp = self.authorize(rb).send().await?;
        check(resp).await
    }

    // ========== Auth ==========

    /// Log in. A 401 here means bad credentials rather than an expired
    /// session, so it is reworded before it reaches the central handler.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let rb = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { username, password });
        let resp = match self.execute(rb).await {
            Err(PennyError::AuthenticationFailure) => {
                return Err(PennyError::Other(
                    "Login failed: invalid username or password".to_string(),
                ))
            }
            other => other?,
        };
        let session = resp.json::<AuthPayload>().await?.into_session()?;
        if !session.enabled {
            return Err(PennyError::Other(
                "Your account is disabled. Please verify your email or contact support."
                    .to_string(),
            ));
        }
        Ok(session)
    }

    pub async fn register(
        &self,
        full_name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let rb = self.http.post(self.url("/api/auth/register")).json(&RegisterRequest {
            full_name,
            username,
            email,
            password,
        });
        let resp = self.execute(rb).await?;
        let session = resp.json::<AuthPayload>().await?.into_session()?;
        if !session.enabled {
            return Err(PennyError::Other(
                "Account is not enabled yet. Please verify your email before logging in."
                    .to_string(),
            ));
        }
        Ok(session)
    }

    /// Best-effort server-side logout. Failure to reach the server must
    /// never block clearing the local session, so every error is dropped.
    pub async fn logout(&self) {
        let rb = self.authorize(self.http.post(self.url("/api/auth/logout")));
        let _ = rb.send().await;
    }

    /// Ask the server to email a password-reset link.
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let rb = self
            .http
            .post(self.url("/api/auth/forgot-password"))
            .json(&ForgotPasswordRequest { email });
        let resp = self.execute(rb).await?;
        Ok(body_message(resp, "If that address is registered, a reset email is on its way.").await)
    }

    /// Set a new password using the token from the reset email. The token
    /// travels as a query parameter, the password in the body.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String> {
        let rb = self
            .http
            .post(self.url(&format!("/api/auth/reset-password?token={token}")))
            .json(&ResetPasswordRequest { new_password });
        let resp = self.execute(rb).await?;
        Ok(body_message(resp, "Password has been reset.").await)
    }

    /// Confirm an email address using the token from the verification email.
    pub async fn verify_email(&self, token: &str) -> Result<String> {
        let rb = self.http.get(self.url(&format!("/api/auth/verify?token={token}")));
        let resp = self.execute(rb).await?;
        Ok(body_message(resp, "Email verified. You can log in now.").await)
    }

    // ========== Transactions ==========

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let resp = self.execute(self.http.get(self.url("/api/transactions"))).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_transaction(&self, transaction: &Transaction) -> Result<Transaction> {
        let rb = self.http.post(self.url("/api/transactions")).json(transaction);
        let resp = self.execute(rb).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.execute(self.http.delete(self.url(&format!("/api/transactions/{id}"))))
            .await?;
        Ok(())
    }

    // ========== Budget ==========

    /// The active budget; `None` when nothing has been created yet (404).
    pub async fn current_budget(&self) -> Result<Option<Budget>> {
        let rb = self.authorize(self.http.get(self.url("/api/budgets/current")));
        let resp = rb.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check(resp).await?;
        Ok(Some(resp.json().await?))
    }

    pub async fn create_budget(&self, budget: &Budget) -> Result<Budget> {
        let rb = self.http.post(self.url("/api/budgets")).json(budget);
        let resp = self.execute(rb).await?;
        Ok(resp.json().await?)
    }

    pub async fn update_budget(&self, id: i64, budget: &Budget) -> Result<Budget> {
        let rb = self.http.put(self.url(&format!("/api/budgets/{id}"))).json(budget);
        let resp = self.execute(rb).await?;
        Ok(resp.json().await?)
    }

    // ========== Server-computed reports ==========

    pub async fn monthly_report(&self, month: u32, year: i32) -> Result<Value> {
        let url = self.url(&format!("/api/reports/monthly?month={month}&year={year}"));
        let resp = self.execute(self.http.get(url)).await?;
        Ok(resp.json().await?)
    }

    pub async fn category_report(&self) -> Result<Value> {
        let resp = self.execute(self.http.get(self.url("/api/reports/category"))).await?;
        Ok(resp.json().await?)
    }

    pub async fn daily_report(&self, date: NaiveDate) -> Result<Value> {
        let url = self.url(&format!("/api/reports/daily?date={date}"));
        let resp = self.execute(self.http.get(url)).await?;
        Ok(resp.json().await?)
    }

    pub async fn summary_report(&self) -> Result<Value> {
        let resp = self.execute(self.http.get(self.url("/api/reports/summary"))).await?;
        Ok(resp.json().await?)
    }
}

/// The server's `{message}` on a successful response, or `fallback` when
/// the body carries none. The auth flows answer with message-only bodies.
async fn body_message(resp: Response, fallback: &str) -> String {
    resp.json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| fallback.to_string())
}

/// Map a non-2xx response to the error taxonomy. 401/403 collapse into
/// the single authentication-failure signal regardless of which call
/// produced them; other client errors carry the backend's message and
/// field errors when the body provides them.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PennyError::AuthenticationFailure);
    }
    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = body
        .message
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    if status.is_server_error() {
        Err(PennyError::Server {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(PennyError::Validation {
            message,
            errors: body.errors.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_payload_canonical_fields() {
        let json = r#"{"accessToken":"abc","username":"alice","email":"a@b.c","enabled":true}"#;
        let s: Session = serde_json::from_str::<AuthPayload>(json)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(s.access_token, "abc");
        assert!(s.enabled);
    }

    #[test]
    fn test_auth_payload_accepts_aliases() {
        let json = r#"{"token":"abc","username":"alice","email":"a@b.c","enable":false}"#;
        let s: Session = serde_json::from_str::<AuthPayload>(json)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(s.access_token, "abc");
        assert!(!s.enabled);
    }

    #[test]
    fn test_auth_payload_rejects_missing_fields() {
        let cases = [
            r#"{"username":"alice","email":"a@b.c","enabled":true}"#,
            r#"{"token":"abc","email":"a@b.c","enabled":true}"#,
            r#"{"token":"abc","username":"alice","enabled":true}"#,
            r#"{"token":"abc","username":"alice","email":"a@b.c"}"#,
            r#"{"token":"","username":"alice","email":"a@b.c","enabled":true}"#,
        ];
        for json in cases {
            let result = serde_json::from_str::<AuthPayload>(json)
                .unwrap()
                .into_session();
            assert!(result.is_err(), "payload should be rejected: {json}");
        }
    }

    #[test]
    fn test_error_body_with_field_errors() {
        let json = r#"{"message":"Validation failed","errors":{"amount":"Amount must be positive","date":"Date is required"}}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.message.as_deref(), Some("Validation failed"));
        let errors = body.errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["amount"], "Amount must be positive");
    }

    #[test]
    fn test_error_body_tolerates_unknown_shape() {
        let body: ErrorBody = serde_json::from_str(r#"{"timestamp":"2024-06-01T00:00:00"}"#).unwrap();
        assert!(body.message.is_none());
        assert!(body.errors.is_none());
    }

    #[test]
    fn test_reset_password_request_uses_camel_case() {
        let json = serde_json::to_string(&ResetPasswordRequest { new_password: "hunter2" }).unwrap();
        assert_eq!(json, r#"{"newPassword":"hunter2"}"#);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiClient::new("http://localhost:8080/", 10, None).unwrap();
        assert_eq!(api.url("/api/transactions"), "http://localhost:8080/api/transactions");
    }
}
