use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::session::Session;

/// One catalog entry as the API emits it.
///
/// Field names match the wire format exactly. `data_vendita` is kept as the
/// raw string and parsed on demand so one unparseable date degrades to "no
/// date" instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub titolo: String,
    pub autore: String,
    #[serde(default)]
    pub casa_editrice: Option<String>,
    #[serde(default)]
    pub venduto: bool,
    #[serde(default)]
    pub pagato: bool,
    #[serde(default)]
    pub prezzo_v: Option<f64>,
    #[serde(default)]
    pub data_vendita: Option<String>,
}

impl Book {
    /// Sale date as a calendar date, if present and parseable.
    pub fn sale_date(&self) -> Option<NaiveDate> {
        self.data_vendita.as_deref().and_then(parse_sale_date)
    }
}

/// Parse a wire sale date: either a plain `YYYY-MM-DD` or the leading date of
/// an RFC 3339 timestamp.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.split('T').next()?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Payload for create and full-replace operations (record minus id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    pub titolo: String,
    pub autore: String,
    pub casa_editrice: Option<String>,
    pub venduto: bool,
    pub pagato: bool,
    pub prezzo_v: Option<f64>,
    pub data_vendita: Option<String>,
}

impl BookDraft {
    /// Enforce the client-side invariant: payment state, price and sale date
    /// are only meaningful for sold records.
    pub fn normalized(mut self) -> Self {
        if !self.venduto {
            self.pagato = false;
            self.prezzo_v = None;
            self.data_vendita = None;
        }
        self
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            titolo: book.titolo.clone(),
            autore: book.autore.clone(),
            casa_editrice: book.casa_editrice.clone(),
            venduto: book.venduto,
            pagato: book.pagato,
            prezzo_v: book.prezzo_v,
            data_vendita: book.data_vendita.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
    },
}

/// Turn a non-2xx response into a `GatewayError`, preferring the server's
/// `detail` message when the body carries one.
async fn check(res: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| format!("request failed with status {}", status));

    tracing::error!("API error ({}): {}", status, message);
    Err(GatewayError::Api { status, message })
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Unauthenticated auth endpoints.
pub struct AuthGateway {
    client: reqwest::Client,
    base_url: String,
}

impl AuthGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::config().base_url())
    }

    /// Exchange credentials for an access token string.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, GatewayError> {
        let res = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let payload = check(res).await?.json::<LoginResponse>().await?;
        Ok(payload.access_token)
    }

    pub async fn register(&self, email: &str, password: &str, role: &str) -> Result<(), GatewayError> {
        let res = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password, "role": role }))
            .send()
            .await?;

        check(res).await?;
        Ok(())
    }
}

/// Bearer-authenticated catalog operations.
///
/// Every call is a single request/response cycle: no retries, no timeout
/// policy, at-most-once.
pub struct RecordGateway {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RecordGateway {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Gateway for the configured endpoint, credentialed with the session's
    /// raw token.
    pub fn for_session(session: &Session) -> Self {
        Self::new(config::config().base_url(), session.token.clone())
    }

    pub async fn list(&self) -> Result<Vec<Book>, GatewayError> {
        let res = self
            .client
            .get(format!("{}/libreria", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Book, GatewayError> {
        let res = self
            .client
            .get(format!("{}/libreria/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    pub async fn create(&self, draft: &BookDraft) -> Result<Book, GatewayError> {
        let res = self
            .client
            .post(format!("{}/libreria/", self.base_url))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    /// Full replace of the record with the given id.
    pub async fn update(&self, id: i64, draft: &BookDraft) -> Result<Book, GatewayError> {
        let res = self
            .client
            .put(format!("{}/libreria/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;

        Ok(check(res).await?.json().await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), GatewayError> {
        let res = self
            .client
            .delete(format!("{}/libreria/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        check(res).await?;
        Ok(())
    }

    /// Flip the paid flag server-side. No body; the caller is expected to
    /// refetch the list afterwards.
    pub async fn toggle_paid(&self, id: i64) -> Result<(), GatewayError> {
        let res = self
            .client
            .patch(format!("{}/libreria/{}/toggle-pagato", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        check(res).await?;
        Ok(())
    }
}
