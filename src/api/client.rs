use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use super::failover::{self, AttemptPlan};
use super::image::ImagePayload;
use super::types::{DetectionResult, EvaluationRequest, EvaluationResult};
use crate::backend::{Backend, BackendSelector};
use crate::error::{NailedItError, Result};

pub const IMAGES_PREFIX: &str = "/api/images/";
pub const FILES_PREFIX: &str = "/api/files/";

/// HTTP client for the detection service.
///
/// Every call takes an optional pinned backend. With `None` the call goes to
/// the selector's active backend and fails over to the other one once.
pub struct ApiClient {
    http: reqwest::Client,
    selector: Arc<BackendSelector>,
}

impl ApiClient {
    pub fn new(selector: Arc<BackendSelector>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("NailedIT/1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| NailedItError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, selector })
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    fn plan(&self, pinned: Option<Backend>) -> AttemptPlan {
        AttemptPlan::new(self.selector.active(), pinned)
    }

    fn base_url(&self, pinned: Option<Backend>) -> String {
        match pinned {
            Some(backend) => self.selector.url(backend).to_string(),
            None => self.selector.current(),
        }
    }

    /// Submit an image for nail detection.
    pub async fn detect(
        &self,
        image: &ImagePayload,
        use_kmeans: bool,
        backend: Option<Backend>,
    ) -> Result<DetectionResult> {
        let plan = self.plan(backend);
        failover::run(&plan, self.selector.endpoints(), "detection", |base| {
            self.detect_once(base, image, use_kmeans)
        })
        .await
    }

    async fn detect_once(
        &self,
        base: String,
        image: &ImagePayload,
        use_kmeans: bool,
    ) -> Result<DetectionResult> {
        let url = format!("{}/api/detect", base);
        info!(
            "Submitting '{}' to {} (use_kmeans={})",
            image.file_name(),
            url,
            use_kmeans
        );

        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())
            .map_err(|e| NailedItError::transport("Detection", e))?;
        let form = Form::new()
            .part("file", part)
            .text("use_kmeans", use_kmeans.to_string());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| NailedItError::transport("Detection", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NailedItError::http("Detection", status));
        }

        let raw: Value = response.json().await.map_err(|e| NailedItError::Decode {
            what: "detection response",
            message: e.to_string(),
        })?;
        let result = DetectionResult::from_response(raw).map_err(|e| NailedItError::Decode {
            what: "detection response",
            message: e.to_string(),
        })?;

        info!(
            "Detection via {}: nail_count={:?}, match_count={:?}",
            base,
            result.metrics.nail_count(),
            result.metrics.match_count()
        );
        Ok(result)
    }

    /// Run model evaluation against a test directory on the backend.
    pub async fn evaluate(
        &self,
        test_dir: &str,
        backend: Option<Backend>,
    ) -> Result<EvaluationResult> {
        let plan = self.plan(backend);
        let body = EvaluationRequest {
            test_dir: test_dir.to_string(),
        };
        failover::run(&plan, self.selector.endpoints(), "evaluation", |base| {
            self.evaluate_once(base, &body)
        })
        .await
    }

    async fn evaluate_once(&self, base: String, body: &EvaluationRequest) -> Result<EvaluationResult> {
        let url = format!("{}/api/evaluate", base);
        info!("Requesting evaluation of '{}' from {}", body.test_dir, url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NailedItError::transport("Evaluation", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NailedItError::http("Evaluation", status));
        }

        response.json().await.map_err(|e| NailedItError::Decode {
            what: "evaluation response",
            message: e.to_string(),
        })
    }

    /// URL of a rendered image. Pure; no request is made.
    pub fn resolve_image_url(&self, name: &str, backend: Option<Backend>) -> String {
        resolve_resource_url(&self.base_url(backend), IMAGES_PREFIX, name)
    }

    /// URL of a downloadable file. Pure; no request is made.
    pub fn resolve_file_url(&self, name: &str, backend: Option<Backend>) -> String {
        resolve_resource_url(&self.base_url(backend), FILES_PREFIX, name)
    }

    /// Fetch the content of a rendered image.
    pub async fn fetch_image(&self, name: &str, backend: Option<Backend>) -> Result<Vec<u8>> {
        let plan = self.plan(backend);
        failover::run(&plan, self.selector.endpoints(), "image fetch", |base| async move {
            let url = resolve_resource_url(&base, IMAGES_PREFIX, name);
            info!("Fetching image {}", url);
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| NailedItError::transport("Image fetch", e))?;
            let status = response.status();
            if !status.is_success() {
                return Err(NailedItError::http("Image fetch", status));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| NailedItError::transport("Image fetch", e))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    /// Download a backend file into `dest_dir`, named after the base name of
    /// `name`. Returns the saved path.
    ///
    /// Content is staged in a temporary file inside `dest_dir` and only
    /// renamed into place once complete. Failed attempts drop the staging
    /// file, which removes it.
    pub async fn download_artifact(
        &self,
        name: &str,
        dest_dir: &Path,
        backend: Option<Backend>,
    ) -> Result<PathBuf> {
        let file_name = artifact_file_name(name)?;
        std::fs::create_dir_all(dest_dir)?;

        let plan = self.plan(backend);
        let staged = failover::run(&plan, self.selector.endpoints(), "download", |base| {
            self.download_once(base, name, dest_dir)
        })
        .await?;

        let target = dest_dir.join(file_name);
        staged
            .persist(&target)
            .map_err(|e| NailedItError::Io(e.error))?;
        info!("Saved {} to {:?}", name, target);
        Ok(target)
    }

    async fn download_once(&self, base: String, name: &str, dest_dir: &Path) -> Result<NamedTempFile> {
        let url = resolve_resource_url(&base, FILES_PREFIX, name);
        info!("Downloading {}", url);

        let mut response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NailedItError::transport("Download", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NailedItError::http("Download", status));
        }

        let mut staged = NamedTempFile::new_in(dest_dir)?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| NailedItError::transport("Download", e))?
        {
            staged.write_all(&chunk)?;
        }
        staged.flush()?;
        Ok(staged)
    }
}

/// Join `base`, `prefix` and `name`, unless `name` already carries the
/// prefix, in which case it is appended verbatim.
pub fn resolve_resource_url(base: &str, prefix: &str, name: &str) -> String {
    if name.starts_with(prefix) {
        format!("{}{}", base, name)
    } else {
        format!("{}{}{}", base, prefix, name)
    }
}

/// The local file name for a downloaded artifact: the text after the last
/// `/`.
pub fn artifact_file_name(name: &str) -> Result<String> {
    let base_name = name.rsplit('/').next().unwrap_or(name);
    if base_name.is_empty() || base_name == "." || base_name == ".." {
        return Err(NailedItError::InvalidInput(format!(
            "'{}' does not name a file",
            name
        )));
    }
    Ok(base_name.to_string())
}
