// SPDX-License-Identifier: MIT

//! Execution engine for visual ML workflows
//!
//! A workflow is a graph of steps (upload, clean, preprocess, split, train,
//! results). Each step is carried out by a remote processing service; this
//! crate plans runs, drives the steps in dependency order and records
//! per-node state.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod graph;
