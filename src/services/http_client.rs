use crate::models::{AppError, AppResult, ComparisonRequest, IterationResult, RemoteDefaults, RunInfo};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Client for the remote comparison service and its baseline catalog.
pub struct CompareServiceClient {
    client: Client,
    base_url: Url,
}

impl CompareServiceClient {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|_| AppError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Stored defaults for prefilling the form. Any failure means "no defaults".
    pub async fn fetch_defaults(&self) -> Option<RemoteDefaults> {
        let url = match self.endpoint(&["api", "config"]) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build config url");
                return None;
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "failed to load defaults");
                return None;
            }
        };

        if !response.status().is_success() {
            info!(status = %response.status(), "no defaults available");
            return None;
        }

        match response.json::<RemoteDefaults>().await {
            Ok(defaults) => Some(defaults),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable defaults");
                None
            }
        }
    }

    pub async fn submit_comparison(&self, request: &ComparisonRequest) -> AppResult<Vec<IterationResult>> {
        let url = self.endpoint(&["api", "compare"])?;
        let response = self.client.post(url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(AppError::RemoteStatus(response.status().as_u16()));
        }

        let results = response.json::<Vec<IterationResult>>().await?;
        Ok(results)
    }

    pub async fn list_services(&self) -> AppResult<Vec<String>> {
        self.get_catalog(&["api", "baselines", "services"]).await
    }

    pub async fn list_dates(&self, service_name: &str) -> AppResult<Vec<String>> {
        self.get_catalog(&["api", "baselines", "dates", service_name]).await
    }

    pub async fn list_runs(&self, service_name: &str, date: &str) -> AppResult<Vec<RunInfo>> {
        self.get_catalog(&["api", "baselines", "runs", service_name, date]).await
    }

    async fn get_catalog<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let url = self.endpoint(segments)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::CatalogLoadError(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::CatalogLoadError(format!(
                "{} responded with {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::CatalogLoadError(format!("{}: {}", url, e)))
    }
}
