// SPDX-License-Identifier: MIT

//! Step dispatcher
//!
//! Maps a node's kind to its remote operation. Preconditions (upstream
//! `pipeline_id`, required config) are checked here so a doomed request is
//! never sent, and every outcome comes back as a `StepResult`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::StepClient;
use crate::error::StepError;
use crate::graph::{
    CleanConfig, CleanOutput, CleaningStrategy, NodeId, NodeKind, PreprocessConfig,
    PreprocessOutput, ResultsOutput, SplitConfig, SplitOutput, StepOutput, TaskKind, TrainConfig,
    TrainOutput, UploadConfig, UploadOutput,
};

pub type StepResult = Result<StepOutput, StepError>;

/// What a step sees when it runs
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub node_id: &'a str,
    /// Output of the single upstream node, `None` for a root
    pub input: Option<&'a StepOutput>,
    /// Outputs produced so far in this run, by node
    pub previous: &'a HashMap<NodeId, StepOutput>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        node_id: &'a str,
        input: Option<&'a StepOutput>,
        previous: &'a HashMap<NodeId, StepOutput>,
    ) -> Self {
        Self {
            node_id,
            input,
            previous,
        }
    }
}

/// Upstream output that carries a usable pipeline id
fn connected<'a>(
    input: Option<&'a StepOutput>,
    remedy: &str,
) -> Result<&'a StepOutput, StepError> {
    input
        .filter(|output| !output.pipeline_id().trim().is_empty())
        .ok_or_else(|| StepError::not_connected(remedy))
}

pub struct StepDispatcher {
    client: Arc<dyn StepClient>,
}

impl StepDispatcher {
    pub fn new(client: Arc<dyn StepClient>) -> Self {
        Self { client }
    }

    pub async fn dispatch(&self, kind: &NodeKind, ctx: StepContext<'_>) -> StepResult {
        log::debug!(
            "Dispatching {} node {} ({} upstream outputs available)",
            kind.node_type(),
            ctx.node_id,
            ctx.previous.len()
        );

        match kind {
            NodeKind::Upload(config) => self.upload(config).await,
            NodeKind::Clean(config) => self.clean(config, ctx.input).await,
            NodeKind::Preprocess(config) => self.preprocess(config, ctx.input).await,
            NodeKind::Split(config) => self.split(config, ctx.input).await,
            NodeKind::Train(config) => self.train(config, ctx.input).await,
            NodeKind::Results => self.results(ctx.input).await,
        }
    }

    async fn upload(&self, config: &UploadConfig) -> StepResult {
        let file = config.file.as_deref().ok_or_else(|| {
            StepError::missing_config(
                "No file selected! Set `file` on this Upload node to a CSV or Excel dataset.",
            )
        })?;

        let resp = self.client.upload(file).await?;
        let message = format!(
            "Dataset uploaded: {} rows, {} columns",
            resp.dataset_info.rows, resp.dataset_info.columns
        );

        Ok(StepOutput::Upload(UploadOutput {
            pipeline_id: resp.pipeline_id,
            dataset_info: resp.dataset_info,
            message,
        }))
    }

    async fn clean(&self, config: &CleanConfig, input: Option<&StepOutput>) -> StepResult {
        let input = connected(
            input,
            "Connect this Clean Data node to an Upload node and run the Upload node first.",
        )?;

        let fill_value = match (config.strategy, config.fill_value.as_deref()) {
            (CleaningStrategy::Constant, None) => {
                return Err(StepError::missing_config(
                    "No fill value set! The constant strategy needs `fill_value` on this Clean Data node.",
                ))
            }
            (CleaningStrategy::Constant, value) => value,
            _ => None,
        };
        let columns = (!config.columns.is_empty()).then_some(config.columns.as_slice());

        let resp = self
            .client
            .clean(input.pipeline_id(), config.strategy, columns, fill_value)
            .await?;

        Ok(StepOutput::Clean(CleanOutput {
            pipeline_id: input.pipeline_id().to_string(),
            dataset_info: input.dataset_info().cloned(),
            missing_before: resp.missing_before,
            missing_after: resp.missing_after,
            rows_before: resp.rows_before,
            rows_after: resp.rows_after,
            cleaned_columns: resp.cleaned_columns,
            strategy: config.strategy,
            message: resp.message,
        }))
    }

    async fn preprocess(&self, config: &PreprocessConfig, input: Option<&StepOutput>) -> StepResult {
        let input = connected(
            input,
            "Connect this Preprocess node to an Upload node (draw a line from Upload to Preprocess) and run the Upload node first.",
        )?;
        if config.columns.is_empty() {
            return Err(StepError::missing_config(
                "No columns selected! Choose at least one numeric column for this Preprocess node.",
            ));
        }

        let resp = self
            .client
            .preprocess(input.pipeline_id(), config.scaler, &config.columns)
            .await?;

        let processed_columns = if resp.processed_columns.is_empty() {
            config.columns.clone()
        } else {
            resp.processed_columns
        };

        Ok(StepOutput::Preprocess(PreprocessOutput {
            pipeline_id: input.pipeline_id().to_string(),
            dataset_info: input.dataset_info().cloned(),
            processed_columns,
            message: resp.message,
        }))
    }

    async fn split(&self, config: &SplitConfig, input: Option<&StepOutput>) -> StepResult {
        let input = connected(
            input,
            "Connect this Split node to the previous node (Upload or Preprocess) and run it first.",
        )?;
        let target_column = config
            .target_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                StepError::missing_config(
                    "No target column selected! Set `target_column` on this Split node to the column you want to predict, like 'passed_exam'.",
                )
            })?;

        let resp = self
            .client
            .split(input.pipeline_id(), config.ratio, target_column)
            .await?;
        let message = format!(
            "Split complete: {} train, {} test",
            resp.train_size, resp.test_size
        );

        Ok(StepOutput::Split(SplitOutput {
            pipeline_id: input.pipeline_id().to_string(),
            dataset_info: input.dataset_info().cloned(),
            train_size: resp.train_size,
            test_size: resp.test_size,
            features: resp.features,
            target_column: resp.target_column,
            message,
        }))
    }

    async fn train(&self, config: &TrainConfig, input: Option<&StepOutput>) -> StepResult {
        let input = connected(
            input,
            "Connect this Train node to a Split node and run the Split node first.",
        )?;
        if config.model.task() != config.task {
            return Err(StepError::invalid_argument(format!(
                "{} is a {} model, but this Train node is set up for {}",
                config.model,
                config.model.task(),
                config.task
            )));
        }

        let resp = self
            .client
            .train(input.pipeline_id(), config.model, config.task)
            .await?;

        let message = match config.task {
            TaskKind::Classification => {
                format!("Model trained! Accuracy: {:.2}%", resp.test_score * 100.0)
            }
            TaskKind::Regression => format!("Model trained! R² Score: {:.3}", resp.test_score),
        };

        Ok(StepOutput::Train(TrainOutput {
            pipeline_id: input.pipeline_id().to_string(),
            dataset_info: input.dataset_info().cloned(),
            model_type: resp.model_type,
            task_type: resp.task_type,
            train_score: resp.train_score,
            test_score: resp.test_score,
            metrics: resp.metrics,
            message,
        }))
    }

    async fn results(&self, input: Option<&StepOutput>) -> StepResult {
        let input = connected(
            input,
            "Connect this Results node to a Train node and run the Train node first.",
        )?;

        let resp = self.client.results(input.pipeline_id()).await?;
        let model_info = resp.model_info.ok_or_else(|| {
            StepError::not_connected(
                "No trained model found for this pipeline. Connect this Results node to a Train node and run it first.",
            )
        })?;

        Ok(StepOutput::Results(ResultsOutput {
            pipeline_id: resp
                .pipeline_id
                .unwrap_or_else(|| input.pipeline_id().to_string()),
            dataset_info: resp.dataset_info.or_else(|| input.dataset_info().cloned()),
            model_info,
            visualizations: resp.visualizations,
            preprocessing: resp.preprocessing,
            split_info: resp.split_info,
            message: "Results retrieved successfully".to_string(),
        }))
    }
}
