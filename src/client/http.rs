// SPDX-License-Identifier: MIT

//! HTTP implementation of the step client

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::types::{
    CleanRequest, CleanResponse, ErrorBody, PreprocessRequest, PreprocessResponse,
    ResultsResponse, SplitRequest, SplitResponse, TrainRequest, TrainResponse, UploadResponse,
};
use super::{validate, StepClient};
use crate::config::ClientConfig;
use crate::error::StepError;
use crate::graph::{CleaningStrategy, ModelKind, ScalerKind, TaskKind};

/// Client for the processing service's `ml/*` endpoints
pub struct HttpStepClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpStepClient {
    pub fn new(config: ClientConfig) -> Result<Self, StepError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StepError::Network {
                operation: "client setup".to_string(),
                message: e.to_string(),
            })?;

        log::info!(
            "Step client: base_url={}, timeout={:?}",
            config.base_url,
            config.timeout
        );

        Ok(Self {
            client,
            base_url: config.base_url,
            timeout: config.timeout,
        })
    }

    /// `<base>/ml/<segments...>`, with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("ml").extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, StepError> {
        let resp = request
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message())
                .unwrap_or_else(|| format!("{} failed with status {}", operation, status.as_u16()));
            log::debug!("{} failed: {} {}", operation, status, message);
            return Err(StepError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StepError::Remote {
            status: status.as_u16(),
            message: format!("{} returned an unreadable response: {}", operation, e),
        })
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> StepError {
        if err.is_timeout() {
            StepError::Timeout {
                operation: operation.to_string(),
                timeout: self.timeout,
            }
        } else {
            StepError::Network {
                operation: operation.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl StepClient for HttpStepClient {
    async fn upload(&self, file: &Path) -> Result<UploadResponse, StepError> {
        let bytes = validate::read_upload_file(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);
        let url = self.endpoint(&["upload"]);
        log::debug!("POST {} ({})", url, file.display());
        self.send("Upload", self.client.post(url).multipart(form)).await
    }

    async fn clean(
        &self,
        pipeline_id: &str,
        strategy: CleaningStrategy,
        columns: Option<&[String]>,
        fill_value: Option<&str>,
    ) -> Result<CleanResponse, StepError> {
        validate::pipeline_id(pipeline_id)?;

        let body = CleanRequest {
            pipeline_id: pipeline_id.to_string(),
            strategy: strategy.as_str().to_string(),
            columns: columns.map(<[String]>::to_vec),
            fill_value: fill_value.map(String::from),
        };
        let url = self.endpoint(&["clean"]);
        log::debug!("POST {}", url);
        self.send("Clean", self.client.post(url).json(&body)).await
    }

    async fn preprocess(
        &self,
        pipeline_id: &str,
        scaler: ScalerKind,
        columns: &[String],
    ) -> Result<PreprocessResponse, StepError> {
        validate::pipeline_id(pipeline_id)?;
        validate::columns(columns)?;

        let body = PreprocessRequest {
            pipeline_id: pipeline_id.to_string(),
            scaler_type: scaler.as_str().to_string(),
            columns: columns.to_vec(),
        };
        let url = self.endpoint(&["preprocess"]);
        log::debug!("POST {}", url);
        self.send("Preprocess", self.client.post(url).json(&body)).await
    }

    async fn split(
        &self,
        pipeline_id: &str,
        ratio: f64,
        target_column: &str,
    ) -> Result<SplitResponse, StepError> {
        validate::pipeline_id(pipeline_id)?;
        validate::non_empty("target_column", target_column)?;
        validate::split_ratio(ratio)?;

        let body = SplitRequest {
            pipeline_id: pipeline_id.to_string(),
            split_ratio: ratio,
            target_column: target_column.to_string(),
        };
        let url = self.endpoint(&["split"]);
        log::debug!("POST {}", url);
        self.send("Split", self.client.post(url).json(&body)).await
    }

    async fn train(
        &self,
        pipeline_id: &str,
        model: ModelKind,
        task: TaskKind,
    ) -> Result<TrainResponse, StepError> {
        validate::pipeline_id(pipeline_id)?;

        let body = TrainRequest {
            pipeline_id: pipeline_id.to_string(),
            model_type: model.as_str().to_string(),
            task_type: task.as_str().to_string(),
        };
        let url = self.endpoint(&["train"]);
        log::debug!("POST {}", url);
        self.send("Train", self.client.post(url).json(&body)).await
    }

    async fn results(&self, pipeline_id: &str) -> Result<ResultsResponse, StepError> {
        validate::pipeline_id(pipeline_id)?;

        let url = self.endpoint(&["results", pipeline_id]);
        log::debug!("GET {}", url);
        self.send("Results", self.client.get(url)).await
    }
}
