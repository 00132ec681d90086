// SPDX-License-Identifier: MIT

//! Remote step client
//!
//! One async operation per workflow step. `HttpStepClient` talks to the
//! processing service over HTTP; tests substitute their own `StepClient`.

mod http;
pub mod types;
pub mod validate;

pub use http::HttpStepClient;

use async_trait::async_trait;
use std::path::Path;

use crate::error::StepError;
use crate::graph::{CleaningStrategy, ModelKind, ScalerKind, TaskKind};
use types::{
    CleanResponse, PreprocessResponse, ResultsResponse, SplitResponse, TrainResponse,
    UploadResponse,
};

/// Request/response contract with the processing service
#[async_trait]
pub trait StepClient: Send + Sync {
    /// Upload a dataset file and start a new pipeline
    async fn upload(&self, file: &Path) -> Result<UploadResponse, StepError>;

    /// Handle missing values. `columns: None` cleans every column.
    async fn clean(
        &self,
        pipeline_id: &str,
        strategy: CleaningStrategy,
        columns: Option<&[String]>,
        fill_value: Option<&str>,
    ) -> Result<CleanResponse, StepError>;

    async fn preprocess(
        &self,
        pipeline_id: &str,
        scaler: ScalerKind,
        columns: &[String],
    ) -> Result<PreprocessResponse, StepError>;

    async fn split(
        &self,
        pipeline_id: &str,
        ratio: f64,
        target_column: &str,
    ) -> Result<SplitResponse, StepError>;

    async fn train(
        &self,
        pipeline_id: &str,
        model: ModelKind,
        task: TaskKind,
    ) -> Result<TrainResponse, StepError>;

    async fn results(&self, pipeline_id: &str) -> Result<ResultsResponse, StepError>;
}
