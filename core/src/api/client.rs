// shopdesk/src/api/client.rs

//! Shared HTTP plumbing: base URL, bearer token, cookie store and the
//! non-2xx → `ShopdeskError::Api` mapping every repository relies on.

use super::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::{ShopdeskError, ShopdeskResult, GENERIC_ERROR_MESSAGE};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct ApiClient {
  http: Client,
  base_url: Url,
  auth: AuthContext,
}

/// `{success, data, message}` wrapper used by the admin endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
  #[serde(default = "envelope_success_default")]
  pub success: bool,
  pub data: Option<T>,
  #[serde(default)]
  pub message: Option<String>,
}

fn envelope_success_default() -> bool {
  true
}

impl<T> Envelope<T> {
  /// Unwraps `data`, turning `success: false` (or a missing payload) into an API error.
  pub fn into_data(self, status: u16) -> ShopdeskResult<T> {
    match (self.success, self.data) {
      (true, Some(data)) => Ok(data),
      (true, None) => Err(ShopdeskError::Decode("response envelope has no data".to_string())),
      (false, _) => Err(ShopdeskError::api(
        status,
        self.message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
      )),
    }
  }
}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: Option<String>,
}

/// Builds the error for a non-2xx response from its status and raw body.
pub fn api_error_from_body(status: u16, body: &str) -> ShopdeskError {
  let message = serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.message)
    .filter(|m| !m.trim().is_empty())
    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
  ShopdeskError::api(status, message)
}

impl ApiClient {
  pub fn new(config: &ClientConfig, auth: AuthContext) -> ShopdeskResult<Self> {
    let http = Client::builder()
      .timeout(config.request_timeout)
      .cookie_store(true)
      .build()
      .map_err(|e| ShopdeskError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let base_url = Url::parse(config.api_base_url.trim_end_matches('/'))
      .map_err(|e| ShopdeskError::Config(format!("Invalid API base URL '{}': {}", config.api_base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(ShopdeskError::Config(format!(
        "API base URL '{}' cannot carry a path",
        config.api_base_url
      )));
    }

    Ok(Self { http, base_url, auth })
  }

  pub fn auth(&self) -> &AuthContext {
    &self.auth
  }

  /// Appends `segments` to the base URL. Each segment is percent-encoded on
  /// its own, so an id holding `/`, `?` or `#` stays inside its segment.
  pub fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // Checked in `new`: the base URL can carry a path.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn request(&self, method: Method, path: &[&str]) -> RequestBuilder {
    let builder = self.http.request(method, self.url(path));
    match self.auth.bearer_token() {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    }
  }

  async fn check(response: Response) -> ShopdeskResult<Response> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = api_error_from_body(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "API request rejected.");
    Err(err)
  }

  pub async fn get_json<T: DeserializeOwned>(&self, path: &[&str], query: &[(&str, String)]) -> ShopdeskResult<T> {
    debug!(?path, "GET");
    let response = self.request(Method::GET, path).query(query).send().await?;
    Ok(Self::check(response).await?.json::<T>().await?)
  }

  /// GET an admin endpoint and unwrap its `{success, data}` envelope.
  pub async fn get_enveloped<T: DeserializeOwned>(&self, path: &[&str], query: &[(&str, String)]) -> ShopdeskResult<T> {
    debug!(?path, "GET (enveloped)");
    let response = self.request(Method::GET, path).query(query).send().await?;
    let response = Self::check(response).await?;
    let status = response.status().as_u16();
    response.json::<Envelope<T>>().await?.into_data(status)
  }

  pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    method: Method,
    path: &[&str],
    body: Option<&B>,
  ) -> ShopdeskResult<T> {
    debug!(%method, ?path, "send");
    let mut request = self.request(method, path);
    if let Some(body) = body {
      request = request.json(body);
    }
    let response = Self::check(request.send().await?).await?;
    Ok(response.json::<T>().await?)
  }

  /// Sends a request whose success body is only an acknowledgement.
  /// An explicit `success: false` in that body is still treated as a failure.
  pub async fn send_ack<B: Serialize + ?Sized>(
    &self,
    method: Method,
    path: &[&str],
    body: Option<&B>,
  ) -> ShopdeskResult<()> {
    debug!(%method, ?path, "send (ack)");
    let mut request = self.request(method, path);
    if let Some(body) = body {
      request = request.json(body);
    }
    let response = Self::check(request.send().await?).await?;
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    ack_from_body(status, &text)
  }
}

#[derive(Deserialize)]
struct AckBody {
  #[serde(default)]
  success: Option<bool>,
  #[serde(default)]
  message: Option<String>,
}

fn ack_from_body(status: u16, body: &str) -> ShopdeskResult<()> {
  match serde_json::from_str::<AckBody>(body) {
    Ok(AckBody {
      success: Some(false),
      message,
    }) => Err(ShopdeskError::api(
      status,
      message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
    )),
    _ => Ok(()),
  }
}

/// Body of the admin hide/abusive endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct ReasonBody<'a> {
  pub reason: &'a str,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_2xx_message_is_used_verbatim() {
    let err = api_error_from_body(400, r#"{"message": "Order already shipped"}"#);
    assert_eq!(err.user_message(), "Order already shipped");
    assert!(matches!(err, ShopdeskError::Api { status: 400, .. }));
  }

  #[test]
  fn non_json_or_empty_message_falls_back_to_generic() {
    assert_eq!(api_error_from_body(502, "<html>Bad gateway</html>").user_message(), GENERIC_ERROR_MESSAGE);
    assert_eq!(api_error_from_body(500, r#"{"message": "  "}"#).user_message(), GENERIC_ERROR_MESSAGE);
  }

  #[derive(Debug, Deserialize, PartialEq)]
  struct Counts {
    total: u32,
  }

  #[test]
  fn envelope_unwraps_payloads_without_a_default() {
    let envelope: Envelope<Counts> = serde_json::from_str(r#"{"success": true, "data": {"total": 4}}"#).unwrap();
    assert_eq!(envelope.into_data(200).unwrap(), Counts { total: 4 });

    let empty: Envelope<Counts> = serde_json::from_str(r#"{"success": true}"#).unwrap();
    assert!(matches!(empty.into_data(200), Err(ShopdeskError::Decode(_))));
  }

  #[test]
  fn envelope_with_success_false_is_an_api_error() {
    let envelope: Envelope<serde_json::Value> =
      serde_json::from_str(r#"{"success": false, "message": "Not an admin"}"#).unwrap();
    let err = envelope.into_data(200).unwrap_err();
    assert_eq!(err.user_message(), "Not an admin");
  }

  #[test]
  fn ack_bodies_only_fail_on_explicit_false() {
    assert!(ack_from_body(200, "").is_ok());
    assert!(ack_from_body(200, r#"{"message": "Review approved"}"#).is_ok());
    assert!(ack_from_body(200, r#"{"success": true}"#).is_ok());
    assert!(ack_from_body(200, r#"{"success": false, "message": "Review not found"}"#).is_err());
  }

  #[test]
  fn urls_join_without_double_slashes() {
    let client = ApiClient::new(&ClientConfig::new("https://shop.test/api/"), AuthContext::anonymous()).unwrap();
    assert_eq!(client.url(&["orders", "mine"]).as_str(), "https://shop.test/api/orders/mine");
    assert_eq!(
      client.url(&["reviews", "admin", "analytics"]).as_str(),
      "https://shop.test/api/reviews/admin/analytics"
    );
  }

  #[test]
  fn ids_cannot_escape_their_path_segment() {
    let client = ApiClient::new(&ClientConfig::new("https://shop.test/api"), AuthContext::anonymous()).unwrap();
    let url = client.url(&["orders", "a/b?c#d", "cancel"]);
    assert_eq!(url.path(), "/api/orders/a%2Fb%3Fc%23d/cancel");
    assert_eq!(url.query(), None);
    assert_eq!(url.fragment(), None);
  }

  #[test]
  fn base_urls_that_cannot_carry_a_path_are_rejected() {
    let err = ApiClient::new(&ClientConfig::new("mailto:shop@test"), AuthContext::anonymous()).unwrap_err();
    assert!(matches!(err, ShopdeskError::Config(_)));
    assert!(ApiClient::new(&ClientConfig::new("not a url"), AuthContext::anonymous()).is_err());
  }
}
