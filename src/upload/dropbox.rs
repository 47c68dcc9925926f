// src/upload/dropbox.rs
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::UploadError;
use crate::export::{to_json, JSON_FILE_NAME};
use crate::preview::PreviewState;

const API_BASE: &str = "https://api.dropboxapi.com/2";
const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

#[derive(Deserialize)]
struct ApiErrorBody {
    error_summary: String,
}

/// Minimal Dropbox v2 client: folder check/creation and overwrite upload.
pub struct DropboxClient {
    http: Client,
    token: String,
    api_base: String,
    content_base: String,
}

impl DropboxClient {
    pub fn new(http: Client, token: impl Into<String>) -> Self {
        Self::with_base_urls(http, token, API_BASE, CONTENT_BASE)
    }

    pub fn with_base_urls(
        http: Client,
        token: impl Into<String>,
        api_base: impl Into<String>,
        content_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            content_base: content_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Serialize the preview's rows and upload them to `folder`.
    pub async fn upload_preview(
        &self,
        state: &PreviewState,
        folder: &str,
    ) -> Result<String, UploadError> {
        if !state.can_save() {
            return Err(UploadError::NoData);
        }
        let json = to_json(&state.rows)?;
        self.upload_json(folder, &json).await
    }

    /// Upload `json` as `<folder>/table-data.json`, creating the folder if
    /// needed. Returns the remote path.
    #[instrument(level = "info", skip(self, json), fields(bytes = json.len()))]
    pub async fn upload_json(&self, folder: &str, json: &str) -> Result<String, UploadError> {
        self.ensure_folder(folder).await?;

        let path = join_path(folder, JSON_FILE_NAME);
        let resp = self
            .http
            .post(format!("{}/files/upload", self.content_base))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", api_arg(&path)?)
            .header("Content-Type", "application/octet-stream")
            .body(json.to_string())
            .send()
            .await?;
        check(resp).await?;

        info!(path = %path, "uploaded to Dropbox");
        Ok(path)
    }

    /// Create `folder` unless it already exists. The root always exists.
    pub async fn ensure_folder(&self, folder: &str) -> Result<(), UploadError> {
        let folder = normalize_folder(folder);
        if folder.is_empty() {
            return Ok(());
        }

        match self.rpc("files/get_metadata", json!({ "path": folder })).await {
            Ok(()) => {
                debug!(folder = %folder, "folder exists");
                Ok(())
            }
            Err(UploadError::Api { summary }) if summary.contains("path/not_found") => {
                self.rpc(
                    "files/create_folder_v2",
                    json!({ "path": folder, "autorename": false }),
                )
                .await
                .map_err(|e| match e {
                    UploadError::Api { summary } => UploadError::CreateFolder { summary },
                    other => other,
                })?;
                info!(folder = %folder, "created folder");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn rpc(&self, endpoint: &str, body: serde_json::Value) -> Result<(), UploadError> {
        let resp = self
            .http
            .post(format!("{}/{}", self.api_base, endpoint))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check(resp).await
    }
}

async fn check(resp: reqwest::Response) -> Result<(), UploadError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await?;
    let err = classify(status, &body);
    warn!(%status, error = %err, "Dropbox request failed");
    Err(err)
}

fn classify(status: StatusCode, body: &str) -> UploadError {
    let summary = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error_summary)
        .unwrap_or_else(|_| body.trim().to_string());
    if status == StatusCode::UNAUTHORIZED || summary.contains("oauth2/token_access_denied") {
        UploadError::TokenExpired
    } else {
        UploadError::Api { summary }
    }
}

/// `""` for the root, otherwise a single leading slash and no trailing one.
fn normalize_folder(folder: &str) -> String {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn join_path(folder: &str, file: &str) -> String {
    format!("{}/{}", normalize_folder(folder), file)
}

/// The `Dropbox-API-Arg` header must be ASCII without DEL, so those are `\u` escaped.
fn api_arg(path: &str) -> Result<String, UploadError> {
    let raw = serde_json::to_string(&json!({ "path": path, "mode": "overwrite" }))?;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() && c != '\x7f' {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn folder_paths_are_normalized() {
        assert_eq!(normalize_folder("/"), "");
        assert_eq!(normalize_folder(""), "");
        assert_eq!(normalize_folder("exports/"), "/exports");
        assert_eq!(normalize_folder("/a/b/"), "/a/b");
        assert_eq!(join_path("/", JSON_FILE_NAME), "/table-data.json");
        assert_eq!(join_path("/a/b/", JSON_FILE_NAME), "/a/b/table-data.json");
    }

    #[test]
    fn api_arg_escapes_non_ascii() -> anyhow::Result<()> {
        let arg = api_arg("/Données/table-data.json")?;
        assert!(arg.is_ascii());
        assert!(arg.contains("\\u00e9"));
        assert!(arg.contains("\"mode\":\"overwrite\""));
        let back: serde_json::Value = serde_json::from_str(&arg)?;
        assert_eq!(back["path"], "/Données/table-data.json");
        Ok(())
    }

    #[test]
    fn api_arg_escapes_delete() -> anyhow::Result<()> {
        let arg = api_arg("/a\x7fb/table-data.json")?;
        assert!(!arg.contains('\x7f'));
        assert!(arg.contains("\\u007f"));
        let back: serde_json::Value = serde_json::from_str(&arg)?;
        assert_eq!(back["path"], "/a\x7fb/table-data.json");
        Ok(())
    }

    #[test]
    fn errors_are_classified() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, r#"{"error_summary": "expired_access_token/"}"#),
            UploadError::TokenExpired
        ));
        assert!(matches!(
            classify(
                StatusCode::BAD_REQUEST,
                r#"{"error_summary": "oauth2/token_access_denied/..."}"#
            ),
            UploadError::TokenExpired
        ));
        match classify(
            StatusCode::CONFLICT,
            r#"{"error_summary": "path/not_found/..", "error": {".tag": "path"}}"#,
        ) {
            UploadError::Api { summary } => assert_eq!(summary, "path/not_found/.."),
            other => panic!("unexpected {:?}", other),
        }
        match classify(StatusCode::INTERNAL_SERVER_ERROR, " boom \n") {
            UploadError::Api { summary } => assert_eq!(summary, "boom"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn refuses_to_upload_an_empty_preview() {
        let client = DropboxClient::new(Client::new(), "token");
        let result = client
            .upload_preview(&PreviewState::default(), "/exports")
            .await;
        assert!(matches!(result, Err(UploadError::NoData)));
    }

    /// One request as the local stub saw it.
    #[derive(Debug, Clone)]
    struct Seen {
        path: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    type Routes = Vec<(&'static str, u16, &'static str)>;

    /// Serve canned `(path, status, body)` responses, one request per connection.
    async fn spawn_stub(routes: Routes) -> anyhow::Result<(String, Arc<Mutex<Vec<Seen>>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}/2", listener.local_addr()?);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = serve_one(socket, &routes, &log).await;
                });
            }
        });
        Ok((base, seen))
    }

    async fn serve_one(
        mut socket: TcpStream,
        routes: &Routes,
        log: &Mutex<Vec<Seen>>,
    ) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await?;
            anyhow::ensure!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();
        let path = request_line.split(' ').nth(1).unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        while buf.len() < header_end + length {
            let n = socket.read(&mut chunk).await?;
            anyhow::ensure!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[header_end..header_end + length]).into_owned();

        let (status, reply) = routes
            .iter()
            .find(|(route, _, _)| path.ends_with(route))
            .map(|(_, status, reply)| (*status, *reply))
            .unwrap_or((404, r#"{"error_summary": "not_routed/"}"#));
        log.lock().unwrap().push(Seen {
            path,
            headers,
            body,
        });

        let response = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reply.len(),
            reply
        );
        socket.write_all(response.as_bytes()).await?;
        socket.shutdown().await?;
        Ok(())
    }

    fn stub_client(base: &str) -> DropboxClient {
        DropboxClient::with_base_urls(Client::new(), "tok", base, base)
    }

    fn paths(seen: &Mutex<Vec<Seen>>) -> Vec<String> {
        seen.lock().unwrap().iter().map(|s| s.path.clone()).collect()
    }

    #[tokio::test]
    async fn uploads_into_existing_folder() -> anyhow::Result<()> {
        let (base, seen) = spawn_stub(vec![
            ("/files/get_metadata", 200, r#"{".tag": "folder"}"#),
            ("/files/upload", 200, r#"{"name": "table-data.json"}"#),
        ])
        .await?;

        let path = stub_client(&base).upload_json("exports/", "[]").await?;
        assert_eq!(path, "/exports/table-data.json");
        assert_eq!(paths(&seen), vec!["/2/files/get_metadata", "/2/files/upload"]);

        let requests = seen.lock().unwrap().clone();
        assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
        assert!(requests[0].body.contains("\"/exports\""));
        let arg: serde_json::Value =
            serde_json::from_str(requests[1].header("dropbox-api-arg").unwrap_or("{}"))?;
        assert_eq!(arg["path"], "/exports/table-data.json");
        assert_eq!(arg["mode"], "overwrite");
        assert_eq!(requests[1].body, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn creates_missing_folder_before_upload() -> anyhow::Result<()> {
        let (base, seen) = spawn_stub(vec![
            ("/files/get_metadata", 409, r#"{"error_summary": "path/not_found/.."}"#),
            ("/files/create_folder_v2", 200, r#"{"metadata": {}}"#),
            ("/files/upload", 200, r#"{}"#),
        ])
        .await?;

        stub_client(&base).upload_json("/new", "[{}]").await?;
        assert_eq!(
            paths(&seen),
            vec![
                "/2/files/get_metadata",
                "/2/files/create_folder_v2",
                "/2/files/upload"
            ]
        );
        let create: serde_json::Value = serde_json::from_str(&seen.lock().unwrap()[1].body)?;
        assert_eq!(create["path"], "/new");
        assert_eq!(create["autorename"], false);
        Ok(())
    }

    #[tokio::test]
    async fn folder_creation_failure_is_reported_as_such() -> anyhow::Result<()> {
        let (base, seen) = spawn_stub(vec![
            ("/files/get_metadata", 409, r#"{"error_summary": "path/not_found/.."}"#),
            ("/files/create_folder_v2", 409, r#"{"error_summary": "path/conflict/folder/"}"#),
        ])
        .await?;

        let err = stub_client(&base).upload_json("/new", "[]").await.unwrap_err();
        match &err {
            UploadError::CreateFolder { summary } => assert_eq!(summary, "path/conflict/folder/"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.to_string(), "Could not create folder: path/conflict/folder/");
        assert!(!paths(&seen).iter().any(|p| p.ends_with("/files/upload")));
        Ok(())
    }

    #[tokio::test]
    async fn unauthorized_upload_asks_for_reauthorization() -> anyhow::Result<()> {
        let (base, _seen) = spawn_stub(vec![
            ("/files/get_metadata", 200, r#"{".tag": "folder"}"#),
            ("/files/upload", 401, r#"{"error_summary": "expired_access_token/"}"#),
        ])
        .await?;

        let result = stub_client(&base).upload_json("/exports", "[]").await;
        assert!(matches!(result, Err(UploadError::TokenExpired)));
        Ok(())
    }
}
