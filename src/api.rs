use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{FlowError, Result};
use crate::filter::{build_query, FilterCriteria, Query};
use crate::models::{Transaction, TransactionInput, User};
use crate::report::{Report, ReportResponse};
use crate::settings::Settings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Reply to login/register. Token-issuing backends put it in `token`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    /// Sign-in succeeded either way; an unreadable body only loses the token.
    fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!("unreadable sign-in reply ({e}): {}", text.trim());
            Self::default()
        })
    }
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Thin async wrapper over the FrugalFlow backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.effective_api_url(), settings.auth_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn google_auth_url(&self) -> String {
        format!("{}/auth/google", self.base_url)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FlowError::Other(format!("invalid auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "backend request");
        Ok(self.http.request(method, url).headers(self.auth_headers()?))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FlowError::Unauthorized);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text.trim().to_string()
                }
            });
        Err(FlowError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(request: RequestBuilder) -> Result<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    // ============= Transactions =============

    #[instrument(skip(self), fields(path = query.path()))]
    pub async fn fetch_transactions(&self, query: &Query) -> Result<Vec<Transaction>> {
        let request = self.request(Method::GET, query.path())?;
        let request = match query {
            Query::All => request,
            Query::Filter(params) => request.query(params),
        };
        Self::send_json(request).await
    }

    pub async fn all_transactions(&self) -> Result<Vec<Transaction>> {
        self.fetch_transactions(&Query::All).await
    }

    /// Empty criteria fall back to the full list.
    pub async fn filter_transactions(&self, criteria: &FilterCriteria) -> Result<Vec<Transaction>> {
        self.fetch_transactions(&build_query(criteria)).await
    }

    #[instrument(skip(self, input))]
    pub async fn add_transaction(&self, input: &TransactionInput) -> Result<()> {
        let request = self.request(Method::POST, "/add-transaction")?.json(input);
        Self::send_empty(request).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_transaction(&self, id: &str, input: &TransactionInput) -> Result<()> {
        let request = self
            .request(Method::PUT, &format!("/update-transaction/{id}"))?
            .json(input);
        Self::send_empty(request).await
    }

    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/delete-transaction/{id}"))?;
        Self::send_empty(request).await
    }

    // ============= Report =============

    #[instrument(skip(self))]
    pub async fn generate_report(&self) -> Result<Report> {
        let body: ReportResponse = Self::send_json(self.request(Method::GET, "/generate-report")?).await?;
        Ok(Report::parse(&body.report))
    }

    // ============= Auth =============

    pub async fn me(&self) -> Result<User> {
        let body: MeResponse = Self::send_json(self.request(Method::GET, "/me")?).await?;
        body.user.ok_or(FlowError::Unauthorized)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.send_credentials("/login", email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.send_credentials("/register", email, password).await
    }

    async fn send_credentials(&self, path: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let request = self
            .request(Method::POST, path)?
            .json(&Credentials { email, password });
        let response = Self::check(request.send().await?).await?;
        let text = response.text().await?;
        Ok(AuthResponse::parse(&text))
    }

    pub async fn logout(&self) -> Result<()> {
        Self::send_empty(self.request(Method::GET, "/logout")?).await
    }
}
