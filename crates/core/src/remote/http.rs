//! HTTP client for the external processing pipeline.
//!
//! Hand-off is three calls: ask the signer for an upload URL, PUT the raw
//! media there, then POST the track metadata to the initiator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::SignedUpload;
use super::{ProcessingPipeline, ProcessingStatus, RemoteError};
use crate::catalog::TrackMeta;

/// Pipeline client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL, e.g. `https://pipeline.example.com`.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    60
}

pub struct HttpPipelineClient {
    client: Client,
    base_url: String,
}

impl HttpPipelineClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(concat!("trackforge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn signed_upload_url(&self, id: &str) -> Result<String, RemoteError> {
        let response = self
            .client
            .get(self.url("s3signer"))
            .query(&[("id", id)])
            .send()
            .await?;
        let signed: SignedUpload = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("signer response for {}: {}", id, e)))?;
        Ok(signed.url)
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

#[async_trait]
impl ProcessingPipeline for HttpPipelineClient {
    async fn submit(&self, meta: &TrackMeta, payload: &[u8]) -> Result<(), RemoteError> {
        let upload_url = self.signed_upload_url(&meta.id).await?;
        debug!("Uploading {} bytes for {}", payload.len(), meta.id);

        let response = self
            .client
            .put(&upload_url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(payload.to_vec())
            .send()
            .await?;
        check_status(response).await?;

        let response = self
            .client
            .post(self.url("initiator"))
            .json(meta)
            .send()
            .await?;
        check_status(response).await?;

        debug!("Processing initiated for {}", meta.id);
        Ok(())
    }

    async fn status(&self, id: &str) -> Result<ProcessingStatus, RemoteError> {
        let response = self
            .client
            .get(self.url("status"))
            .query(&[("id", id)])
            .send()
            .await?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("status response for {}: {}", id, e)))
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.client.get(url).send().await?;
        let bytes = check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteState;
    use axum::body::Bytes;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        initiated: Arc<Mutex<Vec<TrackMeta>>>,
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> HttpPipelineClient {
        HttpPipelineClient::new(&PipelineConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_signs_uploads_and_initiates() {
        let recorded = Recorded::default();

        // The signer needs the server address, which is only known after binding
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let upload_base = base.clone();

        let router = Router::new()
            .route(
                "/s3signer",
                get(move |Query(q): Query<HashMap<String, String>>| {
                    let upload_base = upload_base.clone();
                    async move {
                        let id = q.get("id").cloned().unwrap_or_default();
                        Json(serde_json::json!({ "url": format!("{}/upload/{}", upload_base, id) }))
                    }
                }),
            )
            .route(
                "/upload/{id}",
                put(
                    |State(rec): State<Recorded>,
                     axum::extract::Path(id): axum::extract::Path<String>,
                     headers: HeaderMap,
                     body: Bytes| async move {
                        assert_eq!(
                            headers.get("content-type").unwrap(),
                            "application/octet-stream"
                        );
                        rec.uploads.lock().unwrap().push((id, body.to_vec()));
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/initiator",
                post(|State(rec): State<Recorded>, Json(meta): Json<TrackMeta>| async move {
                    rec.initiated.lock().unwrap().push(meta);
                    StatusCode::OK
                }),
            )
            .with_state(recorded.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let meta = TrackMeta::new("dQw4w9WgXcQ", "Song", "Artist");
        client(&base).submit(&meta, b"raw media").await.unwrap();

        let uploads = recorded.uploads.lock().unwrap().clone();
        assert_eq!(uploads, vec![("dQw4w9WgXcQ".to_string(), b"raw media".to_vec())]);
        let initiated = recorded.initiated.lock().unwrap().clone();
        assert_eq!(initiated, vec![meta]);
    }

    #[tokio::test]
    async fn test_submit_stops_on_signer_error() {
        let router = Router::new().route("/s3signer", get(|| async { StatusCode::FORBIDDEN }));
        let base = serve(router).await;

        let meta = TrackMeta::new("dQw4w9WgXcQ", "Song", "Artist");
        let err = client(&base).submit(&meta, b"x").await.unwrap_err();
        assert!(matches!(err, RemoteError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_status() {
        let router = Router::new().route(
            "/status",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(serde_json::json!({
                    "id": q.get("id").cloned().unwrap_or_default(),
                    "status": "complete",
                    "url": "https://cdn.example.com/a.mp3",
                    "file_name": "a.mp3"
                }))
            }),
        );
        let base = serve(router).await;

        let status = client(&base).status("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(status.id, "dQw4w9WgXcQ");
        assert_eq!(status.status, RemoteState::Complete);
        assert_eq!(status.file_name.as_deref(), Some("a.mp3"));
    }

    #[tokio::test]
    async fn test_status_malformed_body() {
        let router = Router::new().route("/status", get(|| async { "{\"id\":" }));
        let base = serve(router).await;

        let err = client(&base).status("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, RemoteError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_artifact() {
        let router = Router::new()
            .route("/files/a.mp3", get(|| async { Bytes::from_static(b"ID3data") }))
            .route("/files/missing.mp3", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(router).await;
        let client = client(&base);

        let bytes = client
            .fetch_artifact(&format!("{}/files/a.mp3", base))
            .await
            .unwrap();
        assert_eq!(bytes, b"ID3data");

        let err = client
            .fetch_artifact(&format!("{}/files/missing.mp3", base))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Api { status: 404, .. }));
    }
}
