//! Implements the `Classifier` trait by POSTing to the classification service.

use crate::classify::{
    ClassifiedTransaction, ClassifyError, ClassifyRequest, ClassifyResponse, Classifier,
    ErrorResponse, PendingTransaction, CLASSIFICATION_FAILED,
};
use crate::Result;
use anyhow::Context;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Sends one JSON request per call to the classification endpoint. There are no retries.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: Url,
}

impl HttpClassifier {
    /// Creates a classifier for the endpoint at `url`. When `timeout` is `None` requests wait
    /// indefinitely.
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        transactions: &[PendingTransaction],
    ) -> std::result::Result<Vec<ClassifiedTransaction>, ClassifyError> {
        debug!(
            "Sending {} transaction(s) to {} for classification",
            transactions.len(),
            self.url
        );
        let response = self
            .client
            .post(self.url.clone())
            .json(&ClassifyRequest { transactions })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let json = serde_json::from_str::<serde_json::Value>(&body).map_err(|source| {
                ClassifyError::Unreadable {
                    status: status.as_u16(),
                    source,
                }
            })?;
            let message = serde_json::from_value::<ErrorResponse>(json)
                .ok()
                .and_then(|e| e.error)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| CLASSIFICATION_FAILED.to_string());
            debug!("Classification rejected with status {status}: {message}");
            return Err(ClassifyError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: ClassifyResponse = response.json().await?;
        debug!("Received {} prediction(s)", body.classified.len());
        Ok(body.classified)
    }
}
