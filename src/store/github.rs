use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{encode_content, BlobStore, RemoteFile, StoreError};
use crate::config::GitHubConfig;

const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: PutContentInfo,
}

#[derive(Debug, Deserialize)]
struct PutContentInfo {
    sha: String,
}

/// Blob store backed by the GitHub Contents API of one repository.
pub struct GitHubStore {
    http: Client,
    config: GitHubConfig,
}

impl GitHubStore {
    pub fn new(config: GitHubConfig, timeout: Duration) -> Result<Self, StoreError> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let http = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, config })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url,
            self.config.owner,
            self.config.repo,
            path.trim_start_matches('/')
        )
    }

    async fn status_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StoreError::Status { status, message }
    }
}

#[async_trait]
impl BlobStore for GitHubStore {
    fn backend_tag(&self) -> &'static str {
        "github"
    }

    #[tracing::instrument(skip(self))]
    async fn get_file(&self, path: &str) -> Result<RemoteFile, StoreError> {
        let mut request = self
            .http
            .get(self.contents_url(path))
            .bearer_auth(&self.config.token);
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => {
                let body: ContentResponse = response.json().await?;
                Ok(RemoteFile {
                    content: body.content,
                    revision: body.sha,
                })
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            _ => Err(Self::status_error(response).await),
        }
    }

    #[tracing::instrument(skip(self, content))]
    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        revision: Option<&str>,
    ) -> Result<String, StoreError> {
        let body = PutContentRequest {
            message,
            content: encode_content(content),
            sha: revision,
            branch: self.config.branch.as_deref(),
        };

        let response = self
            .http
            .put(self.contents_url(path))
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: PutContentResponse = response.json().await?;
                Ok(body.content.sha)
            }
            // 409 for a stale sha, 422 when an existing file is written without one
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(StoreError::Conflict(path.to_string()))
            }
            _ => Err(Self::status_error(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode as HttpStatus},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use crate::store::local::revision_of;
    use crate::store::decode_content;

    /// In-process stand-in for the Contents API of a single repository.
    #[derive(Clone, Default)]
    struct FakeGitHub {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        seen_auth: Arc<Mutex<Vec<String>>>,
    }

    async fn get_contents(
        State(fake): State<FakeGitHub>,
        Path((_owner, _repo, path)): Path<(String, String, String)>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, HttpStatus> {
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            fake.seen_auth.lock().await.push(auth.to_string());
        }
        let files = fake.files.lock().await;
        let bytes = files.get(&path).ok_or(HttpStatus::NOT_FOUND)?;
        // GitHub wraps base64 at 60 columns
        let encoded = encode_content(bytes);
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        Ok(Json(json!({
            "content": wrapped.join("\n"),
            "sha": revision_of(bytes),
            "encoding": "base64",
        })))
    }

    async fn put_contents(
        State(fake): State<FakeGitHub>,
        Path((_owner, _repo, path)): Path<(String, String, String)>,
        Json(body): Json<Value>,
    ) -> Result<(HttpStatus, Json<Value>), HttpStatus> {
        let mut files = fake.files.lock().await;
        let current = files.get(&path).map(|b| revision_of(b));
        let supplied = body["sha"].as_str().map(str::to_string);
        match (&current, &supplied) {
            (Some(_), None) => return Err(HttpStatus::UNPROCESSABLE_ENTITY),
            (cur, sup) if cur != sup => return Err(HttpStatus::CONFLICT),
            _ => {}
        }
        let bytes = decode_content(body["content"].as_str().unwrap_or_default())
            .map_err(|_| HttpStatus::BAD_REQUEST)?;
        let sha = revision_of(&bytes);
        files.insert(path, bytes);
        let status = if current.is_some() {
            HttpStatus::OK
        } else {
            HttpStatus::CREATED
        };
        Ok((status, Json(json!({ "content": { "sha": sha } }))))
    }

    async fn spawn_fake() -> (FakeGitHub, String) {
        let fake = FakeGitHub::default();
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(get_contents).put(put_contents),
            )
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (fake, format!("http://{}", addr))
    }

    fn store_for(api_url: String) -> GitHubStore {
        GitHubStore::new(
            GitHubConfig {
                token: "test-token".to_string(),
                owner: "owner".to_string(),
                repo: "repo".to_string(),
                branch: None,
                api_url,
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_file_decodes_wrapped_content() {
        let (fake, url) = spawn_fake().await;
        let long_json = serde_json::to_vec_pretty(&json!([{ "title": "x".repeat(200) }])).unwrap();
        fake.files
            .lock()
            .await
            .insert("database.json".to_string(), long_json.clone());

        let store = store_for(url);
        let file = store.get_file("database.json").await.unwrap();
        assert!(file.content.contains('\n'));
        assert_eq!(file.decode().unwrap(), long_json);
        assert_eq!(file.revision, revision_of(&long_json));

        let auth = fake.seen_auth.lock().await;
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0], "Bearer test-token");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_fake, url) = spawn_fake().await;
        let store = store_for(url);
        assert!(matches!(
            store.get_file("user.json").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_put_round_trip_and_conflicts() {
        let (_fake, url) = spawn_fake().await;
        let store = store_for(url);

        let rev1 = store
            .put_file("database2.json", b"[]", "Update WA bots data", None)
            .await
            .unwrap();
        let rev2 = store
            .put_file("database2.json", b"[1]", "Update WA bots data", Some(&rev1))
            .await
            .unwrap();
        assert_eq!(store.get_file("database2.json").await.unwrap().revision, rev2);

        let stale = store
            .put_file("database2.json", b"[2]", "Update WA bots data", Some(&rev1))
            .await;
        assert!(matches!(stale, Err(StoreError::Conflict(_))));

        let blind = store
            .put_file("database2.json", b"[2]", "Update WA bots data", None)
            .await;
        assert!(matches!(blind, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let store = store_for("http://127.0.0.1:9".to_string());
        assert!(matches!(
            store.get_file("database.json").await,
            Err(StoreError::Http(_))
        ));
    }
}
