//! src/services/cloudinary.rs
//!
//! Client for the hosted media API. Exposes the narrow `RemoteMediaStore`
//! interface the storage adapter depends on: one-shot upload of an in-memory
//! buffer and delete by key. Requests are signed with SHA-256 over the sorted
//! parameters plus the API secret.

use crate::config::CloudinaryConfig;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Metadata the remote host reports for a stored asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RemoteAsset {
    pub public_id: String,
    pub format: String,
    pub bytes: i64,
    #[serde(default)]
    pub secure_url: String,
    #[serde(default)]
    pub resource_type: String,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote media host: upload an in-memory buffer under a key, delete by key
/// within the resource class the upload was stored as.
#[async_trait]
pub trait RemoteMediaStore: Send + Sync {
    async fn upload(&self, data: Bytes, key: &str) -> RemoteResult<RemoteAsset>;
    async fn delete(&self, key: &str, resource_type: &str) -> RemoteResult<()>;
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Deserialize)]
struct ApiErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    /// Add `api_key`, `signature_algorithm` and `signature` to `params`.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign_params(&params, &self.config.api_secret);
        params.insert("api_key", self.config.api_key.clone());
        params.insert("signature_algorithm", "sha256".into());
        params.insert("signature", signature);
        params
    }
}

/// SHA-256 hex over `k=v` pairs joined by `&` in key order, secret appended.
pub fn sign_params(params: &BTreeMap<&'static str, String>, secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Decode a JSON success body, or map a non-2xx status to `RemoteError::Api`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> RemoteResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl RemoteMediaStore for CloudinaryClient {
    async fn upload(&self, data: Bytes, key: &str) -> RemoteResult<RemoteAsset> {
        let params = self.signed(BTreeMap::from([
            ("public_id", key.to_string()),
            ("overwrite", "false".to_string()),
            ("use_filename", "true".to_string()),
        ]));

        let file_name = key.rsplit('/').next().unwrap_or(key).to_string();
        let mut form = Form::new().part("file", Part::stream(data).file_name(file_name));
        for (name, value) in params {
            form = form.text(name, value);
        }

        debug!("uploading {} to remote store", key);
        let response = self
            .http
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete(&self, key: &str, resource_type: &str) -> RemoteResult<()> {
        let params = self.signed(BTreeMap::from([("public_id", key.to_string())]));

        let response = self
            .http
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;
        let outcome: DestroyResponse = read_json(response).await?;
        if outcome.result != "ok" {
            warn!("remote delete of {} reported `{}`", key, outcome.result);
        }
        Ok(())
    }
}
