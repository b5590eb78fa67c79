//! Typed client for the Raidplan REST backend.

pub mod models;

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};
use models::{
    Character, CharacterInput, Raid, RaidInput, RosterRecord, Signup, SignupInput, SignupStatus,
    SlotRecord, User,
};

const USER_AGENT: &str = concat!("Raidplan/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotsBody<'a> {
    slots: &'a [SlotRecord],
}

#[derive(Serialize)]
struct StatusBody {
    status: SignupStatus,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Backend page that starts the Discord OAuth flow.
    pub fn login_url(&self) -> String {
        self.url("/auth/discord/login")
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(AppError::NotAuthenticated)?;
        Ok(self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check_status(request.send().await?).await?;
        Ok(())
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    pub async fn current_user(&self) -> Result<User> {
        self.send_json(self.request(Method::GET, "/auth/me")?).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.send_empty(self.request(Method::POST, "/auth/logout")?).await
    }

    // ── Characters ──────────────────────────────────────────────────────────

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        self.send_json(self.request(Method::GET, "/characters")?).await
    }

    pub async fn create_character(&self, input: &CharacterInput) -> Result<Character> {
        self.send_json(self.request(Method::POST, "/characters")?.json(input))
            .await
    }

    pub async fn update_character(&self, id: i64, input: &CharacterInput) -> Result<Character> {
        let path = format!("/characters/{id}");
        self.send_json(self.request(Method::PUT, &path)?.json(input))
            .await
    }

    pub async fn delete_character(&self, id: i64) -> Result<()> {
        let path = format!("/characters/{id}");
        self.send_empty(self.request(Method::DELETE, &path)?).await
    }

    // ── Raids ───────────────────────────────────────────────────────────────

    /// Raids starting between `from` and `to`, both inclusive.
    pub async fn list_raids(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Raid>> {
        let request = self
            .request(Method::GET, "/raids")?
            .query(&[("from", from.to_string()), ("to", to.to_string())]);
        self.send_json(request).await
    }

    pub async fn get_raid(&self, id: i64) -> Result<Raid> {
        let path = format!("/raids/{id}");
        self.send_json(self.request(Method::GET, &path)?).await
    }

    pub async fn create_raid(&self, input: &RaidInput) -> Result<Raid> {
        self.send_json(self.request(Method::POST, "/raids")?.json(input))
            .await
    }

    // ── Sign-ups ────────────────────────────────────────────────────────────

    pub async fn list_signups(&self, raid_id: i64) -> Result<Vec<Signup>> {
        let path = format!("/raids/{raid_id}/signups");
        self.send_json(self.request(Method::GET, &path)?).await
    }

    pub async fn sign_up(&self, raid_id: i64, input: &SignupInput) -> Result<Signup> {
        let path = format!("/raids/{raid_id}/signups");
        self.send_json(self.request(Method::POST, &path)?.json(input))
            .await
    }

    pub async fn set_signup_status(&self, signup_id: i64, status: SignupStatus) -> Result<Signup> {
        let path = format!("/signups/{signup_id}");
        self.send_json(
            self.request(Method::PATCH, &path)?
                .json(&StatusBody { status }),
        )
        .await
    }

    // ── Roster ──────────────────────────────────────────────────────────────

    /// `None` when the raid has no roster saved yet.
    pub async fn get_roster(&self, raid_id: i64) -> Result<Option<RosterRecord>> {
        let path = format!("/raids/{raid_id}/roster");
        let response = self.request(Method::GET, &path)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    pub async fn save_roster(&self, raid_id: i64, slots: &[SlotRecord]) -> Result<RosterRecord> {
        let path = format!("/raids/{raid_id}/roster");
        self.send_json(self.request(Method::PUT, &path)?.json(&SlotsBody { slots }))
            .await
    }

    pub async fn finalize_roster(&self, raid_id: i64, slots: &[SlotRecord]) -> Result<RosterRecord> {
        let path = format!("/raids/{raid_id}/roster/finalize");
        self.send_json(self.request(Method::POST, &path)?.json(&SlotsBody { slots }))
            .await
    }

    pub async fn suggest_roster(&self, raid_id: i64) -> Result<RosterRecord> {
        let path = format!("/raids/{raid_id}/roster/suggest");
        self.send_json(self.request(Method::POST, &path)?).await
    }
}

/// Turns a non-2xx response into an error carrying the backend's message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::NotAuthenticated);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Picks the most useful message out of an error body: a JSON `error` or
/// `message` field, the raw text, or the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value[key].as_str() {
                return msg.to_string();
            }
        }
    }
    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://raids.example.gg/api/");
        assert_eq!(client.base_url(), "https://raids.example.gg/api");
        assert_eq!(
            client.url("/raids/4/roster"),
            "https://raids.example.gg/api/raids/4/roster"
        );
        assert_eq!(
            client.login_url(),
            "https://raids.example.gg/api/auth/discord/login"
        );
    }

    #[test]
    fn test_requests_need_a_token() {
        let client = ApiClient::new("http://localhost:8080");
        assert!(matches!(
            client.request(Method::GET, "/characters"),
            Err(AppError::NotAuthenticated)
        ));

        let client = client.with_token(Some("abc".into()));
        let request = client
            .request(Method::GET, "/characters")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8080/characters");
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer abc"
        );
    }

    #[test]
    fn test_token_can_be_cleared() {
        let mut client = ApiClient::new("http://localhost:8080");
        client.set_token("t".into());
        assert_eq!(client.token(), Some("t"));
        client.clear_token();
        assert_eq!(client.token(), None);
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"error":"roster already finalized"}"#),
            "roster already finalized"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"spec is required"}"#),
            "spec is required"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream timed out\n"),
            "upstream timed out"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"code":17}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_raid_range_query() {
        let client = ApiClient::new("http://localhost:8080").with_token(Some("t".into()));
        let from = NaiveDate::from_ymd_opt(2026, 9, 28).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let request = client
            .request(Method::GET, "/raids")
            .unwrap()
            .query(&[("from", from.to_string()), ("to", to.to_string())])
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("from=2026-09-28&to=2026-11-01"));
    }
}
