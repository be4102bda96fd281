//! Analysis orchestrator: Idle → Running → {Succeeded, Failed, Cancelled}.
//!
//! Owns at most one in-flight reasoning call. State is published on a
//! `watch` channel; it is the only thing callers should read. Failed and
//! Cancelled accept `retry`; Succeeded holds until `reset`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::mapping::{build_analysis_result, AnalysisRequest, AnalysisResponse};
use super::prompt::{analysis_system_prompt, analysis_user_message};
use crate::config::AnalysisOptions;
use crate::models::{AnalysisResult, PainAssessment, UserProfile};
use crate::persistence::PipelineStore;
use crate::pipeline::assessment::AssessmentSession;
use crate::pipeline::reasoning::{FailureNotice, ReasoningClient, ReasoningError};
use crate::pipeline::recovery::parse;
use crate::pipeline::safety::screen_assessments;
use crate::pipeline::task::InFlight;

/// Published analysis state.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Running,
    Succeeded(Arc<AnalysisResult>),
    Failed(FailureNotice),
    Cancelled,
}

impl AnalysisState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    fn accepts_retry(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Cancelled)
    }
}

#[derive(Default)]
struct Inner {
    flight: InFlight,
    last_request: Option<AnalysisRequest>,
}

struct Shared {
    client: Arc<dyn ReasoningClient>,
    store: Option<Arc<dyn PipelineStore>>,
    options: AnalysisOptions,
    inner: Mutex<Inner>,
    state: watch::Sender<AnalysisState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct AnalysisOrchestrator {
    shared: Arc<Shared>,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn ReasoningClient>, options: AnalysisOptions) -> Self {
        Self::build(client, options, None)
    }

    /// Persist each successful result through `store`, fire-and-forget.
    pub fn with_store(
        client: Arc<dyn ReasoningClient>,
        options: AnalysisOptions,
        store: Arc<dyn PipelineStore>,
    ) -> Self {
        Self::build(client, options, Some(store))
    }

    fn build(
        client: Arc<dyn ReasoningClient>,
        options: AnalysisOptions,
        store: Option<Arc<dyn PipelineStore>>,
    ) -> Self {
        let (state, _) = watch::channel(AnalysisState::Idle);
        Self {
            shared: Arc::new(Shared {
                client,
                store,
                options,
                inner: Mutex::new(Inner::default()),
                state,
            }),
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.shared.state.subscribe()
    }

    /// Begin analysis of the completed assessments. Must be called inside a
    /// Tokio runtime. Returns `false` without side effects when there is
    /// nothing to analyze or a result is already held. A call while Running
    /// supersedes the older run.
    pub fn start(&self, assessments: Vec<PainAssessment>, profile: UserProfile) -> bool {
        if assessments.is_empty() {
            tracing::debug!("Analysis start ignored: no completed assessments");
            return false;
        }

        let mut inner = self.shared.lock();
        if self.shared.state.borrow().result().is_some() {
            tracing::debug!("Analysis start ignored: result already held, reset first");
            return false;
        }

        let request = AnalysisRequest {
            assessments,
            profile,
        };
        inner.last_request = Some(request.clone());
        launch(&self.shared, &mut inner, request);
        true
    }

    /// Start from a session's completed slots and profile snapshot.
    pub fn start_from_session(&self, session: &AssessmentSession) -> bool {
        self.start(session.completed_assessments(), session.profile().clone())
    }

    /// Abort the in-flight call. Its result, if it still arrives, is dropped.
    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        if !inner.flight.abort() {
            return false;
        }
        tracing::info!("Analysis cancelled");
        self.shared.state.send_replace(AnalysisState::Cancelled);
        true
    }

    /// Re-run the last request. Only from Failed or Cancelled.
    pub fn retry(&self) -> bool {
        let mut inner = self.shared.lock();
        if !self.shared.state.borrow().accepts_retry() {
            return false;
        }
        let Some(request) = inner.last_request.clone() else {
            return false;
        };
        tracing::info!("Retrying analysis");
        launch(&self.shared, &mut inner, request);
        true
    }

    /// Drop all analysis state, cancelling any in-flight call first.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        if inner.flight.abort() {
            tracing::info!("Analysis reset cancelled in-flight call");
        }
        inner.last_request = None;
        self.shared.state.send_replace(AnalysisState::Idle);
    }
}

impl Drop for AnalysisOrchestrator {
    fn drop(&mut self) {
        self.shared.lock().flight.abort();
    }
}

fn launch(shared: &Arc<Shared>, inner: &mut Inner, request: AnalysisRequest) {
    let (generation, token) = inner.flight.begin();
    shared.state.send_replace(AnalysisState::Running);
    tracing::info!(
        generation,
        regions = request.assessments.len(),
        "Analysis started"
    );

    let task_shared = Arc::clone(shared);
    let handle = tokio::spawn(async move {
        run(task_shared, generation, token, request).await;
    });
    inner.flight.attach(generation, handle);
}

async fn run(
    shared: Arc<Shared>,
    generation: u64,
    token: CancellationToken,
    request: AnalysisRequest,
) {
    let system_prompt = analysis_system_prompt();
    let user_message = analysis_user_message(
        &request.assessments,
        &request.profile,
        Local::now().date_naive(),
    );
    let screening = screen_assessments(&request.assessments);

    let outcome = tokio::select! {
        _ = token.cancelled() => Err(ReasoningError::Cancelled),
        reply = shared.client.send(&system_prompt, &user_message) => reply.and_then(|text| {
            parse::<AnalysisResponse>(&text).map_err(ReasoningError::from)
        }),
    };

    let next = match outcome {
        Ok(response) => {
            let result = build_analysis_result(
                response,
                request,
                screening,
                &shared.options,
                Utc::now(),
            );
            AnalysisState::Succeeded(Arc::new(result))
        }
        Err(ReasoningError::Cancelled) => {
            tracing::debug!(generation, "Analysis run observed cancellation");
            return;
        }
        Err(e) => {
            tracing::warn!(generation, kind = ?e.kind(), error = %e, "Analysis failed");
            AnalysisState::Failed(e.to_notice())
        }
    };

    let persisted = {
        let mut inner = shared.lock();
        if !inner.flight.finish(generation) {
            tracing::debug!(generation, "Discarding stale analysis result");
            return;
        }
        let persisted = next.result().cloned();
        shared.state.send_replace(next);
        persisted
    };

    if let Some(result) = persisted {
        tracing::info!(
            generation,
            analysis_id = %result.id,
            conditions = result.conditions.len(),
            screening_flags = result.screening_flags.len(),
            "Analysis succeeded"
        );
        if let Some(store) = shared.store.clone() {
            tokio::spawn(async move {
                if let Err(e) = store.persist_analysis(&result).await {
                    tracing::warn!(analysis_id = %result.id, error = %e, "Failed to persist analysis");
                }
            });
        }
    }
}
