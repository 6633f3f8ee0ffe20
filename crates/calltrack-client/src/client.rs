//! HTTP client for the hosted data store and auth provider

use crate::error::{ClientError, ClientResult, extract_message};
use calltrack_core::config::RemoteConfig;
use calltrack_core::types::CurrentUser;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

/// Sort direction for [`RowQuery::order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Client for row queries, remote procedures and the current-user lookup
///
/// Every request carries the project's public key; requests made on behalf
/// of a user also carry that user's access token.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RemoteClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| ClientError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// A copy of this client acting as the user holding `token`
    #[must_use]
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Start a query against `table`
    pub fn from(&self, table: &str) -> RowQuery<'_> {
        RowQuery {
            client: self,
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    /// Call a remote procedure and decode its JSON result
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or the
    /// result does not decode into `T`.
    pub async fn rpc<P, T>(&self, function: &str, params: &P) -> ClientResult<T>
    where
        P: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{function}", self.base_url);
        debug!("Calling remote procedure {}", function);

        let response = self
            .authorize(self.client.post(&url))
            .json(params)
            .send()
            .await?;

        decode(check(response).await?).await
    }

    /// Call a remote procedure whose result is ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn rpc_unit<P>(&self, function: &str, params: &P) -> ClientResult<()>
    where
        P: Serialize + Sync + ?Sized,
    {
        let url = format!("{}/rest/v1/rpc/{function}", self.base_url);
        debug!("Calling remote procedure {}", function);

        let response = self
            .authorize(self.client.post(&url))
            .json(params)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Look up the user the access token belongs to
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing, expired or rejected.
    pub async fn current_user(&self) -> ClientResult<CurrentUser> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        decode(check(response).await?).await
    }
}

/// A row query under construction
///
/// Filters map onto the store's `column=operator.value` query syntax.
#[derive(Debug)]
pub struct RowQuery<'a> {
    client: &'a RemoteClient,
    table: String,
    params: Vec<(String, String)>,
}

impl RowQuery<'_> {
    /// Restrict the returned columns
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    /// `column = value`
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column >= value`
    #[must_use]
    pub fn gte(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("gte.{value}")));
        self
    }

    /// `column <= value`
    #[must_use]
    pub fn lte(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("lte.{value}")));
        self
    }

    /// `column >= instant`, with the instant in UTC RFC 3339
    #[must_use]
    pub fn since(self, column: &str, instant: DateTime<Utc>) -> Self {
        self.gte(column, instant.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Sort by `column`
    #[must_use]
    pub fn order(mut self, column: &str, order: Order) -> Self {
        let direction = match order {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Return at most `count` rows
    #[must_use]
    pub fn limit(mut self, count: u64) -> Self {
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Skip the first `count` rows
    #[must_use]
    pub fn offset(mut self, count: u64) -> Self {
        self.params.push(("offset".to_string(), count.to_string()));
        self
    }

    fn url(&self) -> String {
        format!("{}/rest/v1/{}", self.client.base_url, self.table)
    }

    /// Run the query and decode every row
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or a
    /// row does not decode into `T`.
    pub async fn fetch<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        debug!("Querying {} with {:?}", self.table, self.params);

        let response = self
            .client
            .authorize(self.client.client.get(self.url()))
            .query(&self.params)
            .send()
            .await?;

        decode(check(response).await?).await
    }

    /// Run the query and return the first row, if any
    ///
    /// # Errors
    ///
    /// Same as [`RowQuery::fetch`].
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> ClientResult<Option<T>> {
        let rows = self.limit(1).fetch::<T>().await?;
        Ok(rows.into_iter().next())
    }

    /// Delete every row matching the filters
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn delete(self) -> ClientResult<()> {
        debug!("Deleting from {} with {:?}", self.table, self.params);

        let response = self
            .client
            .authorize(self.client.client.delete(self.url()))
            .query(&self.params)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Turn non-success responses into [`ClientError::Api`]
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body);
    warn!(
        "Remote call failed with status {}: {}",
        status.as_u16(),
        message.as_deref().unwrap_or("no message")
    );

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(base_url: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url.to_string(),
            anon_key: "anon".to_string(),
            request_timeout: 5,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RemoteClient::new(&config("https://project.example.co/")).unwrap();
        assert_eq!(client.base_url(), "https://project.example.co");
    }

    #[test]
    fn test_query_params_accumulate_in_order() {
        let client = RemoteClient::new(&config("https://project.example.co")).unwrap();
        let query = client
            .from("call_records")
            .select("*")
            .eq("user_id", "abc")
            .order("created_at", Order::Descending)
            .limit(21)
            .offset(20);

        assert_eq!(query.url(), "https://project.example.co/rest/v1/call_records");
        assert_eq!(
            query.params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "21".to_string()),
                ("offset".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_since_formats_utc() {
        use chrono::TimeZone;
        let client = RemoteClient::new(&config("https://project.example.co")).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let query = client.from("call_records").since("created_at", instant);
        assert_eq!(
            query.params,
            vec![(
                "created_at".to_string(),
                "gte.2026-01-02T03:04:05Z".to_string()
            )]
        );
    }

    #[test]
    fn test_with_access_token_keeps_original_anonymous() {
        let client = RemoteClient::new(&config("https://project.example.co")).unwrap();
        let user_client = client.with_access_token("jwt");

        assert!(client.access_token.is_none());
        assert_eq!(user_client.access_token.as_deref(), Some("jwt"));
        assert_eq!(user_client.anon_key, "anon");
    }
}
