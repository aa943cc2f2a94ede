//! Analysis API endpoints

use crate::SiftClient;
use crate::error::{ClientError, Result};
use sift_core::dto::analysis::{
    AnalyzeRequest, AnalyzeResponse, CollectAndAnalyzeRequest, CollectAndAnalyzeResponse,
    CollectRequest, CollectResponse,
};

impl SiftClient {
    /// Collect reviews for a product without touching the index
    pub async fn collect(&self, req: &CollectRequest) -> Result<CollectResponse> {
        let url = format!("{}/collect", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Collect reviews and rebuild the retrieval index
    pub async fn fetch_reviews(&self, req: &CollectRequest) -> Result<CollectResponse> {
        let url = format!("{}/fetch-reviews", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Ask a question against the current index
    pub async fn analyze(&self, req: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        let url = format!("{}/analyze", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Collect, index and answer in one request
    pub async fn collect_and_analyze(
        &self,
        req: &CollectAndAnalyzeRequest,
    ) -> Result<CollectAndAnalyzeResponse> {
        let url = format!("{}/collect-and-analyze", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), text));
        }

        Ok(())
    }
}
