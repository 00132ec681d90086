// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use mlpipe_rs::client::HttpStepClient;
use mlpipe_rs::config::ClientConfig;
use mlpipe_rs::dispatcher::StepDispatcher;
use mlpipe_rs::engine::{EngineEvent, ExecutionPlan, WorkflowEngine};
use mlpipe_rs::graph::{catalog, NodeStatus, WorkflowLoader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workflow file against the processing service
    Run {
        /// Path to the workflow file
        #[arg(short, long)]
        file: PathBuf,

        /// Only run this node and everything upstream of it
        #[arg(long)]
        from: Option<String>,
    },
    /// Load a workflow file and show its execution plan
    Validate {
        /// Path to the workflow file
        #[arg(short, long)]
        file: PathBuf,

        /// Plan a run from this node instead of the whole graph
        #[arg(long)]
        from: Option<String>,
    },
    /// List the available node types
    Nodes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Run { file, from } => run(file, from).await,
        Commands::Validate { file, from } => validate(file, from),
        Commands::Nodes => {
            for entry in catalog::catalog() {
                println!(
                    "{:<12} {:<18} {}",
                    entry.node_type.as_str(),
                    entry.label,
                    entry.description
                );
                if !entry.required.is_empty() {
                    println!("{:<12} requires: {}", "", entry.required.join(", "));
                }
            }
            Ok(())
        }
    }
}

async fn run(file: PathBuf, from: Option<String>) -> anyhow::Result<()> {
    let workflow = WorkflowLoader::load_workflow(&file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    let config = ClientConfig::from_env()?;
    let client = Arc::new(HttpStepClient::new(config)?);

    println!("Running workflow: {}", workflow.name);
    let graph = workflow.graph.into_shared();

    let (tx, mut rx) = mpsc::channel(64);
    let engine =
        WorkflowEngine::new(graph.clone(), StepDispatcher::new(client)).with_events(tx);

    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                EngineEvent::NodeStarted {
                    node_id, node_type, ..
                } => println!("  ▶ {} ({})", node_id, node_type),
                EngineEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ✗ {}: {}", node_id, error)
                }
                EngineEvent::FocusNode { node_id } => println!("  ★ results ready at {}", node_id),
                _ => {}
            }
        }
    });

    let result = match from.as_deref() {
        Some(node_id) => engine.run_from(node_id).await,
        None => engine.run_all().await,
    };
    // closes the event channel
    drop(engine);
    progress.await?;
    let summary = result?;

    let executed: HashSet<&str> = summary
        .succeeded
        .iter()
        .chain(&summary.failed)
        .map(String::as_str)
        .collect();

    let graph = graph.read().await;
    println!();
    for node in graph.nodes().iter().filter(|n| executed.contains(n.id.as_str())) {
        let detail = match node.status {
            NodeStatus::Failed => node.error.clone().unwrap_or_default(),
            _ => node
                .output
                .as_ref()
                .map(|o| o.message().to_string())
                .unwrap_or_default(),
        };
        println!(
            "{:<16} {:<10} {:<9} {}",
            node.id,
            node.node_type(),
            node.status,
            detail
        );
    }

    println!(
        "\n{} of {} executed node(s) succeeded, {} failed in {} ms (run {})",
        summary.succeeded.len(),
        summary.executed(),
        summary.failed.len(),
        summary.duration().num_milliseconds(),
        summary.run_id
    );

    if !summary.is_success() {
        anyhow::bail!("{} node(s) failed", summary.failed.len());
    }
    Ok(())
}

fn validate(file: PathBuf, from: Option<String>) -> anyhow::Result<()> {
    let workflow = WorkflowLoader::load_workflow(&file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    let snapshot = workflow.graph.snapshot();

    let plan = match from.as_deref() {
        Some(node_id) => ExecutionPlan::from_node(&snapshot, node_id)?,
        None => ExecutionPlan::whole(&snapshot)?,
    };

    println!("Workflow: {}", workflow.name);
    if !workflow.description.is_empty() {
        println!("{}", workflow.description);
    }
    println!(
        "{} nodes, {} edges",
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    println!("Roots: {}", plan.roots().join(", "));
    println!("Execution order:");
    for (i, id) in plan.traversal_order(&snapshot).iter().enumerate() {
        let node_type = snapshot
            .node(id)
            .map(|n| n.node_type().as_str())
            .unwrap_or("?");
        println!("  {}. {} ({})", i + 1, id, node_type);
    }
    Ok(())
}
