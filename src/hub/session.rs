use crate::config::ResolvedConfig;
use crate::constants::{BACKUPS_PATH, DOWNLOAD_PATH_PREFIX, LOGIN_PATH};
use crate::errors::{AppError, AppResult};
use crate::hub::models::{BackupDescriptor, BackupList};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// An HTTP session against one hub's maintenance interface.
///
/// All requests go through a single `reqwest::Client` with a cookie store, so
/// the session cookie handed out by [`HubSession::authenticate`] is sent with
/// every later call. The session does not track whether login happened;
/// callers authenticate first.
pub struct HubSession {
    client: reqwest::Client,
    address: String,
    hub_id: String,
    base_url: Url,
}

impl HubSession {
    /// Creates a session for the hub at `address`.
    ///
    /// The maintenance port and timeouts come from `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `address` does not form a valid URL host and
    /// `HttpClient` if the client cannot be built.
    pub fn new(address: &str, hub_id: &str, config: &ResolvedConfig) -> AppResult<Self> {
        let base_url = Url::parse(&format!("http://{address}:{}/", config.maintenance_port))?;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::HttpClient(format!("Failed to build client: {e}")))?;

        Ok(Self {
            client,
            address: address.to_string(),
            hub_id: hub_id.to_string(),
            base_url,
        })
    }

    /// Network address the session talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Signs in to the maintenance interface.
    ///
    /// Posts the credential derived from the hub identifier to `/newLogin`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the hub answers with a non-200 status or an
    /// unsuccessful response, and `RequestError` if the request cannot be
    /// completed at all.
    pub async fn authenticate(&self) -> AppResult<()> {
        info!(address = %self.address, "Signing in");

        let method = "POST";
        let credential = login_credential(&self.hub_id);
        let response = self.send(method, LOGIN_PATH, Some(credential)).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(method, LOGIN_PATH, e.to_string()))?;

        verify_json(status, &body).map_err(|reason| AppError::AuthError {
            address: self.address.clone(),
            reason,
        })?;

        debug!(address = %self.address, "Signed in");
        Ok(())
    }

    /// Issues a structured request and returns the verified JSON body.
    ///
    /// Sends a GET when `body` is `None` and a POST otherwise. The response must
    /// have status 200 and carry `"success": true`.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` with the path and the reason on transport failure,
    /// non-200 status, malformed JSON or an unsuccessful response.
    pub async fn request_json(&self, path: &str, body: Option<String>) -> AppResult<Value> {
        let method = if body.is_some() { "POST" } else { "GET" };
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(method, path, e.to_string()))?;

        verify_json(status, &bytes).map_err(|reason| request_error(method, path, reason))
    }

    /// Fetches a raw, unparsed response body.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` on transport failure or a non-200 status.
    pub async fn download(&self, path: &str) -> AppResult<Vec<u8>> {
        let url = self.url_for("GET", path)?;
        self.download_url(path, url).await
    }

    /// Lists the backups currently stored on the hub, in hub order.
    pub async fn list_backups(&self) -> AppResult<Vec<BackupDescriptor>> {
        let value = self.request_json(BACKUPS_PATH, None).await?;
        let list: BackupList = serde_json::from_value(value).map_err(|e| {
            request_error("GET", BACKUPS_PATH, format!("unexpected backup list: {e}"))
        })?;
        Ok(list.into_backups())
    }

    /// Downloads the archive bytes of the backup called `name`.
    ///
    /// The name is sent as one percent-encoded path segment, so characters such
    /// as `/`, `?` or `#` cannot change which endpoint is requested.
    pub async fn download_backup(&self, name: &str) -> AppResult<Vec<u8>> {
        let path = format!("{DOWNLOAD_PATH_PREFIX}{name}");
        let url = self.backup_url(name).map_err(|reason| request_error("GET", &path, reason))?;
        self.download_url(&path, url).await
    }

    fn backup_url(&self, name: &str) -> Result<Url, String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| "base URL cannot carry a path".to_string())?
            .pop_if_empty()
            .extend(DOWNLOAD_PATH_PREFIX.split('/').filter(|s| !s.is_empty()))
            .push(name);
        Ok(url)
    }

    async fn download_url(&self, path: &str, url: Url) -> AppResult<Vec<u8>> {
        let method = "GET";
        let response = self.send_url(method, path, url, None).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(request_error(method, path, status.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(method, path, e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn url_for(&self, method: &'static str, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| request_error(method, path, format!("invalid path: {e}")))
    }

    async fn send(
        &self,
        method: &'static str,
        path: &str,
        body: Option<String>,
    ) -> AppResult<reqwest::Response> {
        let url = self.url_for(method, path)?;
        self.send_url(method, path, url, body).await
    }

    async fn send_url(
        &self,
        method: &'static str,
        path: &str,
        url: Url,
        body: Option<String>,
    ) -> AppResult<reqwest::Response> {
        let request = match body {
            Some(body) => self.client.post(url).body(body),
            None => self.client.get(url),
        };

        request
            .send()
            .await
            .map_err(|e| request_error(method, path, e.to_string()))
    }
}

/// Derives the maintenance login from a hub identifier.
///
/// Separators are stripped and the rest upper-cased, so `34:e1:d1:00:11:22`
/// becomes `34E1D1001122`.
pub fn login_credential(hub_id: &str) -> String {
    hub_id
        .chars()
        .filter(|c| !matches!(c, ':' | '-') && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Checks a structured response, returning the parsed body or the reason it was
/// rejected.
pub(crate) fn verify_json(status: StatusCode, body: &[u8]) -> Result<Value, String> {
    if status != StatusCode::OK {
        return Err(status.to_string());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("malformed response: {e}"))?;

    match value.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(value),
        Some(false) => Err(format!(
            "not successful: {}",
            String::from_utf8_lossy(body).trim()
        )),
        None => Err("response has no boolean success flag".to_string()),
    }
}

fn request_error(method: &'static str, path: &str, reason: String) -> AppError {
    AppError::RequestError {
        method,
        path: path.to_string(),
        reason,
    }
}
