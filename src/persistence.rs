//! Storage collaborator for finished analyses and plans.
//!
//! The pipeline hands results over fire-and-forget: writes are spawned,
//! never awaited by the state machines, and never retried.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::{AnalysisResult, RehabPlan};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No application data directory on this system")]
    NoDataDir,
}

#[async_trait]
pub trait PipelineStore: Send + Sync {
    async fn persist_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError>;
    async fn persist_plan(&self, plan: &RehabPlan) -> Result<(), StoreError>;
}

// ═══════════════════════════════════════════════════════════
// JSON files
// ═══════════════════════════════════════════════════════════

/// Pretty JSON per record: `<root>/analyses/<id>.json`, `<root>/plans/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the application data directory.
    pub fn from_app_data() -> Result<Self, StoreError> {
        config::app_data_dir()
            .map(Self::new)
            .ok_or(StoreError::NoDataDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analysis_path(&self, id: &Uuid) -> PathBuf {
        self.root.join("analyses").join(format!("{id}.json"))
    }

    pub fn plan_path(&self, id: &Uuid) -> PathBuf {
        self.root.join("plans").join(format!("{id}.json"))
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, json).await?;
        tracing::debug!(path = %path.display(), "Wrote record");
        Ok(())
    }
}

#[async_trait]
impl PipelineStore for JsonFileStore {
    async fn persist_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        Self::write_json(&self.analysis_path(&result.id), result).await
    }

    async fn persist_plan(&self, plan: &RehabPlan) -> Result<(), StoreError> {
        Self::write_json(&self.plan_path(&plan.id), plan).await
    }
}

// ═══════════════════════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════════════════════

/// Keeps everything in memory. For tests and embedding without a disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    analyses: Mutex<Vec<AnalysisResult>>,
    plans: Mutex<Vec<RehabPlan>>,
}

impl MemoryStore {
    pub fn analyses(&self) -> Vec<AnalysisResult> {
        self.analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn plans(&self) -> Vec<RehabPlan> {
        self.plans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PipelineStore for MemoryStore {
    async fn persist_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        self.analyses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    async fn persist_plan(&self, plan: &RehabPlan) -> Result<(), StoreError> {
        self.plans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plan.clone());
        Ok(())
    }
}
