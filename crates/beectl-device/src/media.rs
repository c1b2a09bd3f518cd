//! Request/response client for the device's asset library.
//!
//! Independent of the command channel: listing, uploading and fetching go over
//! plain HTTP. Retry and caching policy live with the caller
//! (`beectl-app`'s media library), not here.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};

use beectl_core::prelude::*;

use crate::endpoints::DeviceEndpoints;

/// Multipart field the device expects the upload in.
pub const UPLOAD_FIELD: &str = "file";

/// Asset library operations.
#[trait_variant::make(MediaStore: Send)]
pub trait LocalMediaStore {
    /// Fetch the current asset filenames, in device order.
    async fn list(&self) -> Result<Vec<String>>;

    /// Upload one file.
    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<()>;

    /// Download the raw bytes of an asset.
    async fn fetch(&self, file_name: &str) -> Result<Bytes>;

    /// Address an asset can be fetched from. Pure; no network access.
    fn resolve_url(&self, file_name: &str) -> String;
}

/// [`MediaStore`] backed by the device's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpMediaStore {
    http: Client,
    endpoints: DeviceEndpoints,
}

impl HttpMediaStore {
    pub fn new(endpoints: DeviceEndpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &DeviceEndpoints {
        &self.endpoints
    }
}

impl MediaStore for HttpMediaStore {
    async fn list(&self) -> Result<Vec<String>> {
        let url = self.endpoints.media_index_url()?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::asset_fetch(e.to_string()))?;
        let response = ensure_success(response)
            .await
            .map_err(|e| Error::asset_fetch(e.to_string()))?;
        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| Error::asset_fetch(format!("invalid media list: {e}")))
    }

    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        let url = self.endpoints.media_index_url()?;
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::asset_upload(e.to_string()))?;
        ensure_success(response)
            .await
            .map_err(|e| Error::asset_upload(e.to_string()))?;

        debug!("Uploaded asset '{}'", file_name);
        Ok(())
    }

    async fn fetch(&self, file_name: &str) -> Result<Bytes> {
        let url = self.endpoints.media_file_url(file_name)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;
        let response = ensure_success(response).await?;
        response.bytes().await.map_err(|e| Error::http(e.to_string()))
    }

    fn resolve_url(&self, file_name: &str) -> String {
        match self.endpoints.media_file_url(file_name) {
            Ok(url) => url.to_string(),
            // Only reachable with a host that cannot form a URL at all.
            Err(_) => format!(
                "http://{}:{}/media/{}",
                self.endpoints.host(),
                self.endpoints.port(),
                file_name
            ),
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        Err(Error::http(format!("unexpected status {status}")))
    } else {
        Err(Error::http(format!("unexpected status {status}: {body}")))
    }
}
