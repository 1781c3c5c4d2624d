//! reqwest implementation of [`PlayApi`] against `androidpublisher/v3`

use super::types::{ExpansionFileResponse, UploadedBinary};
use super::*;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Production endpoint
pub const DEFAULT_API_BASE: &str = "https://androidpublisher.googleapis.com";

const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP client bound to one bearer token
pub struct HttpPlayApi {
  client: Client,
  base: String,
  token: String,
}

impl HttpPlayApi {
  /// Create a client. `timeout` bounds every request, uploads included.
  pub fn new(base: impl Into<String>, token: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("play-rail/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      client,
      base: base.into().trim_end_matches('/').to_string(),
      token: token.into(),
    })
  }

  fn edits_url(&self, package: &str) -> String {
    format!("{}/androidpublisher/v3/applications/{}/edits", self.base, package)
  }

  fn edit_url(&self, edit: &EditRef) -> String {
    format!("{}/{}", self.edits_url(&edit.package), edit.edit_id)
  }

  fn upload_url(&self, edit: &EditRef, path: &str) -> String {
    format!(
      "{}/upload/androidpublisher/v3/applications/{}/edits/{}/{}?uploadType=media",
      self.base, edit.package, edit.edit_id, path
    )
  }

  async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
    let response = request.bearer_auth(&self.token).send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| body.chars().take(200).collect());
    warn!(status = %status, message = %message, "Play API request failed");
    Err(ApiError::Status {
      status: status.as_u16(),
      message,
    })
  }

  async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
    let response = self.send(request).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// Stream `path` as the request body; the file is never held in memory
  async fn upload<T: DeserializeOwned>(&self, url: String, content_type: &str, path: &Path) -> ApiResult<T> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    debug!(url = %url, path = %path.display(), bytes = len, "uploading");
    let request = self
      .client
      .post(url)
      .header(CONTENT_TYPE, content_type)
      .header(CONTENT_LENGTH, len)
      .body(Body::from(file));
    self.send_json(request).await
  }
}

/// Pull `error.message` out of a Google API error envelope
fn error_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  value
    .get("error")?
    .get("message")?
    .as_str()
    .map(str::to_string)
}

#[async_trait]
impl PlayApi for HttpPlayApi {
  async fn open_edit(&self, package: &str) -> ApiResult<AppEdit> {
    debug!(package, "opening edit");
    self
      .send_json(self.client.post(self.edits_url(package)).json(&serde_json::json!({})))
      .await
  }

  async fn upload_artifact(&self, edit: &EditRef, kind: ArtifactKind, path: &Path) -> ApiResult<VersionCode> {
    let url = self.upload_url(edit, kind.collection());
    let uploaded: UploadedBinary = self.upload(url, kind.content_type(), path).await?;
    Ok(uploaded.version_code)
  }

  async fn upload_expansion_file(
    &self,
    edit: &EditRef,
    version_code: VersionCode,
    path: &Path,
  ) -> ApiResult<ExpansionFile> {
    let url = self.upload_url(edit, &format!("apks/{}/expansionFiles/main", version_code));
    let response: ExpansionFileResponse = self.upload(url, BINARY_CONTENT_TYPE, path).await?;
    Ok(response.expansion_file)
  }

  async fn upload_mapping(&self, edit: &EditRef, version_code: VersionCode, path: &Path) -> ApiResult<()> {
    let url = self.upload_url(edit, &format!("apks/{}/deobfuscationFiles/proguard", version_code));
    let _: serde_json::Value = self.upload(url, BINARY_CONTENT_TYPE, path).await?;
    Ok(())
  }

  async fn get_track(&self, edit: &EditRef, track: &str) -> ApiResult<Track> {
    debug!(edit_id = %edit.edit_id, track, "fetching track");
    let url = format!("{}/tracks/{}", self.edit_url(edit), track);
    self.send_json(self.client.get(url)).await
  }

  async fn update_track(&self, edit: &EditRef, track: &Track) -> ApiResult<Track> {
    debug!(edit_id = %edit.edit_id, track = %track.track, "updating track");
    let url = format!("{}/tracks/{}", self.edit_url(edit), track.track);
    self.send_json(self.client.put(url).json(track)).await
  }

  async fn update_listing(&self, edit: &EditRef, listing: &Listing) -> ApiResult<Listing> {
    debug!(edit_id = %edit.edit_id, language = %listing.language, "updating listing");
    let url = format!("{}/listings/{}", self.edit_url(edit), listing.language);
    self.send_json(self.client.put(url).json(listing)).await
  }

  async fn commit(&self, edit: &EditRef, changes_not_sent_for_review: bool) -> ApiResult<AppEdit> {
    debug!(edit_id = %edit.edit_id, changes_not_sent_for_review, "committing edit");
    let mut url = format!("{}:commit", self.edit_url(edit));
    if changes_not_sent_for_review {
      url.push_str("?changesNotSentForReview=true");
    }
    // bodiless POSTs are rejected with 411 unless the length is explicit
    let request = self.client.post(url).header(CONTENT_LENGTH, 0u64).body(Vec::new());
    self.send_json(request).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  /// Answer one request on a local port; the handle yields the raw request
  async fn serve_once(status: &'static str, body: &'static str) -> (HttpPlayApi, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = Vec::new();
      let mut chunk = [0u8; 4096];
      let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
          break pos + 4;
        }
      };
      let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
      let body_len = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .map(|v| v.trim().parse::<usize>().unwrap())
        .unwrap_or(0);
      while buf.len() < head_end + body_len {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
      }

      let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.unwrap();
      String::from_utf8_lossy(&buf).into_owned()
    });

    let api = HttpPlayApi::new(format!("http://{}", addr), "tok", Duration::from_secs(5)).unwrap();
    (api, handle)
  }

  fn edit() -> EditRef {
    EditRef::new("com.example.app", "e1")
  }

  fn request_body(request: &str) -> &str {
    request.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
  }

  fn api() -> HttpPlayApi {
    HttpPlayApi::new("https://example.test/", "token", Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn test_urls() {
    let api = api();
    let edit = EditRef::new("com.example.app", "e1");
    assert_eq!(
      api.edit_url(&edit),
      "https://example.test/androidpublisher/v3/applications/com.example.app/edits/e1"
    );
    assert_eq!(
      api.upload_url(&edit, ArtifactKind::Bundle.collection()),
      "https://example.test/upload/androidpublisher/v3/applications/com.example.app/edits/e1/bundles?uploadType=media"
    );
  }

  #[test]
  fn test_error_message_from_envelope() {
    let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
    assert_eq!(error_message(body).as_deref(), Some("The caller does not have permission"));
    assert_eq!(error_message("<html>bad gateway</html>"), None);
  }

  #[tokio::test]
  async fn test_commit_sends_explicit_empty_body() {
    let (api, server) = serve_once("200 OK", r#"{"id":"e1"}"#).await;

    let committed = api.commit(&edit(), true).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(committed.id, "e1");
    assert!(
      request.starts_with(
        "POST /androidpublisher/v3/applications/com.example.app/edits/e1:commit?changesNotSentForReview=true HTTP/1.1"
      ),
      "{}",
      request
    );
    let lower = request.to_lowercase();
    assert!(lower.contains("content-length: 0\r\n"), "{}", request);
    assert!(lower.contains("authorization: bearer tok\r\n"), "{}", request);
    assert_eq!(request_body(&request), "");
  }

  #[tokio::test]
  async fn test_update_track_puts_codes_as_strings() {
    let (api, server) = serve_once("200 OK", r#"{"track":"beta","releases":[]}"#).await;
    let track = Track {
      track: "beta".to_string(),
      releases: vec![TrackRelease {
        version_codes: vec![7, 8],
        status: Some(ReleaseStatus::InProgress),
        user_fraction: Some(0.25),
        ..Default::default()
      }],
    };

    let returned = api.update_track(&edit(), &track).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(returned.track, "beta");
    assert!(
      request.starts_with("PUT /androidpublisher/v3/applications/com.example.app/edits/e1/tracks/beta HTTP/1.1"),
      "{}",
      request
    );
    assert!(request.to_lowercase().contains("content-type: application/json"));
    let sent: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
    assert_eq!(sent["releases"][0]["versionCodes"], serde_json::json!(["7", "8"]));
    assert_eq!(sent["releases"][0]["status"], "inProgress");
    assert_eq!(sent["releases"][0]["userFraction"], 0.25);
  }

  #[tokio::test]
  async fn test_bundle_upload_streams_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.aab");
    fs::write(&path, b"bundle-bytes").unwrap();
    let (api, server) = serve_once("200 OK", r#"{"versionCode":42}"#).await;

    let code = api.upload_artifact(&edit(), ArtifactKind::Bundle, &path).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(code, 42);
    assert!(
      request.starts_with(
        "POST /upload/androidpublisher/v3/applications/com.example.app/edits/e1/bundles?uploadType=media HTTP/1.1"
      ),
      "{}",
      request
    );
    let lower = request.to_lowercase();
    assert!(lower.contains("content-type: application/octet-stream\r\n"), "{}", request);
    assert!(lower.contains("content-length: 12\r\n"), "{}", request);
    assert_eq!(request_body(&request), "bundle-bytes");
  }

  #[tokio::test]
  async fn test_expansion_upload_decodes_string_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.7.com.example.app.obb");
    fs::write(&path, b"obb").unwrap();
    let (api, server) = serve_once("200 OK", r#"{"expansionFile":{"fileSize":"3"}}"#).await;

    let file = api.upload_expansion_file(&edit(), 7, &path).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(file.file_size, Some(3));
    assert!(request.contains("/edits/e1/apks/7/expansionFiles/main?uploadType=media"), "{}", request);
  }

  #[tokio::test]
  async fn test_error_status_decodes_envelope() {
    let (api, server) = serve_once(
      "403 Forbidden",
      r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#,
    )
    .await;

    let err = api.get_track(&edit(), "beta").await.unwrap_err();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /androidpublisher/v3/applications/com.example.app/edits/e1/tracks/beta HTTP/1.1"));
    match err {
      ApiError::Status { status, message } => {
        assert_eq!(status, 403);
        assert_eq!(message, "The caller does not have permission");
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }
}
