//! Plan generator: model path first, static catalog on failure.
//!
//! Mirrors the analysis orchestrator: one in-flight call, state published on
//! a `watch` channel, late results dropped by generation check. Unlike
//! analysis, a failed model path is recovered by substituting a catalog plan
//! (unless disabled), and the outcome records which path produced the plan.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::catalog::fallback_exercises;
use super::prompt::{plan_system_prompt, plan_user_message};
use super::scheduler::schedule;
use crate::config::PlanOptions;
use crate::models::{AnalysisResult, Difficulty, RehabExercise, RehabPlan};
use crate::persistence::PipelineStore;
use crate::pipeline::reasoning::{FailureNotice, ReasoningClient, ReasoningError};
use crate::pipeline::recovery::{parse, ResponseSchema};
use crate::pipeline::task::InFlight;

pub const FALLBACK_PLAN_NAME: &str = "Personalized Rehab Plan";
pub const FALLBACK_TOTAL_WEEKS: u32 = 4;
pub const MIN_TOTAL_WEEKS: u32 = 4;
pub const MAX_TOTAL_WEEKS: u32 = 8;

// ═══════════════════════════════════════════════════════════
// Wire schema
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan_name: String,
    pub exercises: Vec<WireExercise>,
    pub total_weeks: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ResponseSchema for PlanResponse {
    const NAME: &'static str = "plan";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExercise {
    pub name: String,
    pub target_area: String,
    pub description: String,
    pub sets: u32,
    pub reps: String,
    pub rest_seconds: u32,
    pub difficulty: String,
    pub demonstration_icon: String,
    pub tips: Vec<String>,
    pub contraindications: Vec<String>,
}

impl WireExercise {
    fn into_exercise(self) -> RehabExercise {
        RehabExercise {
            id: Uuid::new_v4(),
            name: self.name,
            target_area: self.target_area,
            description: self.description,
            sets: self.sets,
            reps: self.reps,
            rest_seconds: self.rest_seconds,
            difficulty: Difficulty::normalize(&self.difficulty),
            demonstration_icon: self.demonstration_icon,
            tips: self.tips,
            contraindications: self.contraindications,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Plan assembly
// ═══════════════════════════════════════════════════════════

/// Where a plan's exercises came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PlanSource {
    Model,
    /// Model path failed; `notice` says why.
    Fallback { notice: FailureNotice },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub plan: RehabPlan,
    #[serde(flatten)]
    pub source: PlanSource,
}

impl PlanOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PlanSource::Fallback { .. })
    }
}

/// Map a decoded model plan. An empty exercise list counts as no content.
pub fn build_model_plan(
    response: PlanResponse,
    analysis: &AnalysisResult,
    created_at: DateTime<Utc>,
) -> Result<RehabPlan, ReasoningError> {
    if response.exercises.is_empty() {
        tracing::warn!("Model plan contained no exercises");
        return Err(ReasoningError::NoContent);
    }

    let exercises: Vec<RehabExercise> = response
        .exercises
        .into_iter()
        .map(WireExercise::into_exercise)
        .collect();
    let weekly_schedule = schedule(&exercises, &analysis.profile.activity_level);

    let total_weeks = response
        .total_weeks
        .clamp(i64::from(MIN_TOTAL_WEEKS), i64::from(MAX_TOTAL_WEEKS)) as u32;
    if i64::from(total_weeks) != response.total_weeks {
        tracing::debug!(
            requested = response.total_weeks,
            total_weeks,
            "Clamped plan length"
        );
    }

    Ok(RehabPlan {
        id: Uuid::new_v4(),
        plan_name: response.plan_name.trim().to_string(),
        conditions: analysis.condition_names(),
        exercises,
        weekly_schedule,
        total_weeks,
        created_at,
        notes: response
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

/// Catalog plan for the analysis' conditions. Pure: no I/O.
pub fn build_fallback_plan(analysis: &AnalysisResult, created_at: DateTime<Utc>) -> RehabPlan {
    let conditions = analysis.condition_names();
    let exercises = fallback_exercises(&conditions);
    let weekly_schedule = schedule(&exercises, &analysis.profile.activity_level);

    RehabPlan {
        id: Uuid::new_v4(),
        plan_name: FALLBACK_PLAN_NAME.to_string(),
        conditions,
        exercises,
        weekly_schedule,
        total_weeks: FALLBACK_TOTAL_WEEKS,
        created_at,
        notes: None,
    }
}

// ═══════════════════════════════════════════════════════════
// Generator
// ═══════════════════════════════════════════════════════════

/// Published plan state.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanState {
    Idle,
    Generating,
    Succeeded(Arc<PlanOutcome>),
    Failed(FailureNotice),
    Cancelled,
}

impl PlanState {
    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating)
    }

    pub fn outcome(&self) -> Option<&Arc<PlanOutcome>> {
        match self {
            Self::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Inner {
    flight: InFlight,
    last_analysis: Option<Arc<AnalysisResult>>,
}

struct Shared {
    client: Arc<dyn ReasoningClient>,
    store: Option<Arc<dyn PipelineStore>>,
    options: PlanOptions,
    inner: Mutex<Inner>,
    state: watch::Sender<PlanState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct PlanGenerator {
    shared: Arc<Shared>,
}

impl PlanGenerator {
    pub fn new(client: Arc<dyn ReasoningClient>, options: PlanOptions) -> Self {
        Self::build(client, options, None)
    }

    /// Persist each plan through `store`, fire-and-forget.
    pub fn with_store(
        client: Arc<dyn ReasoningClient>,
        options: PlanOptions,
        store: Arc<dyn PipelineStore>,
    ) -> Self {
        Self::build(client, options, Some(store))
    }

    fn build(
        client: Arc<dyn ReasoningClient>,
        options: PlanOptions,
        store: Option<Arc<dyn PipelineStore>>,
    ) -> Self {
        let (state, _) = watch::channel(PlanState::Idle);
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

    pub fn state(&self) -> PlanState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlanState> {
        self.shared.state.subscribe()
    }

    /// Generate a plan for `analysis`, superseding any run in flight.
    /// Must be called inside a Tokio runtime.
    pub fn generate(&self, analysis: Arc<AnalysisResult>) {
        let mut inner = self.shared.lock();
        inner.last_analysis = Some(Arc::clone(&analysis));
        launch(&self.shared, &mut inner, analysis);
    }

    /// Re-run from the model path for the last analysis. `false` if there is
    /// none.
    pub fn regenerate(&self) -> bool {
        let mut inner = self.shared.lock();
        let Some(analysis) = inner.last_analysis.clone() else {
            return false;
        };
        tracing::info!("Regenerating plan");
        launch(&self.shared, &mut inner, analysis);
        true
    }

    pub fn cancel(&self) -> bool {
        let mut inner = self.shared.lock();
        if !inner.flight.abort() {
            return false;
        }
        tracing::info!("Plan generation cancelled");
        self.shared.state.send_replace(PlanState::Cancelled);
        true
    }

    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.flight.abort();
        inner.last_analysis = None;
        self.shared.state.send_replace(PlanState::Idle);
    }
}

impl Drop for PlanGenerator {
    fn drop(&mut self) {
        self.shared.lock().flight.abort();
    }
}

fn launch(shared: &Arc<Shared>, inner: &mut Inner, analysis: Arc<AnalysisResult>) {
    let (generation, token) = inner.flight.begin();
    shared.state.send_replace(PlanState::Generating);
    tracing::info!(
        generation,
        analysis_id = %analysis.id,
        conditions = analysis.conditions.len(),
        "Plan generation started"
    );

    let task_shared = Arc::clone(shared);
    let handle = tokio::spawn(async move {
        run(task_shared, generation, token, analysis).await;
    });
    inner.flight.attach(generation, handle);
}

async fn run(
    shared: Arc<Shared>,
    generation: u64,
    token: CancellationToken,
    analysis: Arc<AnalysisResult>,
) {
    let system_prompt = plan_system_prompt();
    let user_message = plan_user_message(&analysis, Local::now().date_naive());

    let model_plan = tokio::select! {
        _ = token.cancelled() => Err(ReasoningError::Cancelled),
        reply = shared.client.send(&system_prompt, &user_message) => reply
            .and_then(|text| parse::<PlanResponse>(&text).map_err(ReasoningError::from))
            .and_then(|response| build_model_plan(response, &analysis, Utc::now())),
    };

    let next = match model_plan {
        Ok(plan) => PlanState::Succeeded(Arc::new(PlanOutcome {
            plan,
            source: PlanSource::Model,
        })),
        Err(ReasoningError::Cancelled) => {
            tracing::debug!(generation, "Plan run observed cancellation");
            return;
        }
        Err(e) if shared.options.fallback_enabled => {
            tracing::warn!(
                generation,
                kind = ?e.kind(),
                error = %e,
                "Model plan failed, using catalog fallback"
            );
            PlanState::Succeeded(Arc::new(PlanOutcome {
                plan: build_fallback_plan(&analysis, Utc::now()),
                source: PlanSource::Fallback {
                    notice: e.to_notice(),
                },
            }))
        }
        Err(e) => {
            tracing::warn!(generation, kind = ?e.kind(), error = %e, "Plan generation failed");
            PlanState::Failed(e.to_notice())
        }
    };

    let persisted = {
        let mut inner = shared.lock();
        if !inner.flight.finish(generation) {
            tracing::debug!(generation, "Discarding stale plan");
            return;
        }
        let persisted = next.outcome().cloned();
        shared.state.send_replace(next);
        persisted
    };

    if let Some(outcome) = persisted {
        tracing::info!(
            generation,
            plan_id = %outcome.plan.id,
            exercises = outcome.plan.exercises.len(),
            fallback = outcome.is_fallback(),
            "Plan ready"
        );
        if let Some(store) = shared.store.clone() {
            tokio::spawn(async move {
                if let Err(e) = store.persist_plan(&outcome.plan).await {
                    tracing::warn!(plan_id = %outcome.plan.id, error = %e, "Failed to persist plan");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::persistence::MemoryStore;
    use crate::pipeline::reasoning::{FailureKind, MockReasoningClient, MockReply};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn condition(name: &str) -> ConditionResult {
        ConditionResult {
            id: Uuid::new_v4(),
            condition_name: name.into(),
            common_name: name.into(),
            confidence: 80.0,
            explanation: "e".into(),
            what_it_means: "w".into(),
            how_to_manage: "h".into(),
            is_red_flag: false,
            red_flag_message: None,
            next_steps: vec![],
        }
    }

    fn analysis(conditions: &[&str], activity_level: &str) -> Arc<AnalysisResult> {
        Arc::new(AnalysisResult {
            id: Uuid::new_v4(),
            assessments: vec![],
            conditions: conditions.iter().map(|c| condition(c)).collect(),
            overall_summary: "s".into(),
            disclaimer_text: ANALYSIS_DISCLAIMER.into(),
            generated_at: Utc::now(),
            profile: UserProfile {
                user_id: "u1".into(),
                first_name: "Jo".into(),
                last_name: "Park".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
                sex: "Female".into(),
                height_feet: 5,
                height_inches: 7,
                weight: 140.0,
                medical_conditions: vec![],
                other_medical_conditions: None,
                surgeries: vec![],
                injuries: vec![],
                activity_level: activity_level.into(),
                primary_sport: None,
            },
            screening_flags: vec![],
        })
    }

    fn wire_exercise(name: &str, difficulty: &str) -> serde_json::Value {
        json!({
            "name": name,
            "targetArea": "Knee",
            "description": "d",
            "sets": 3,
            "reps": "10-12",
            "restSeconds": 30,
            "difficulty": difficulty,
            "demonstrationIcon": "figure.flexibility",
            "tips": ["a", "b"],
            "contraindications": ["c"]
        })
    }

    fn plan_json(exercises: Vec<serde_json::Value>, total_weeks: i64) -> String {
        json!({
            "planName": "Knee Recovery",
            "exercises": exercises,
            "totalWeeks": total_weeks,
            "notes": "Go easy."
        })
        .to_string()
    }

    fn generator(replies: Vec<MockReply>, options: PlanOptions) -> (PlanGenerator, Arc<MockReasoningClient>) {
        let client = Arc::new(MockReasoningClient::new(replies));
        (PlanGenerator::new(client.clone(), options), client)
    }

    async fn settle(generator: &PlanGenerator) -> PlanState {
        let mut rx = generator.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| !s.is_generating()),
        )
        .await
        .expect("plan generation did not settle")
        .expect("state channel closed")
        .clone();
        state
    }

    #[test]
    fn model_plan_normalizes_difficulty_and_weeks() {
        let response: PlanResponse = serde_json::from_str(&plan_json(
            vec![wire_exercise("A", "ADVANCED"), wire_exercise("B", "expert")],
            12,
        ))
        .unwrap();
        let plan = build_model_plan(response, &analysis(&["Meniscus Tear"], "athlete"), Utc::now()).unwrap();
        assert_eq!(plan.exercises[0].difficulty, Difficulty::Advanced);
        assert_eq!(plan.exercises[1].difficulty, Difficulty::Beginner);
        assert_eq!(plan.total_weeks, MAX_TOTAL_WEEKS);
        assert_eq!(plan.conditions, vec!["Meniscus Tear"]);
        assert_eq!(plan.notes.as_deref(), Some("Go easy."));
        assert_eq!(plan.active_days(), 5);
    }

    #[test]
    fn short_plan_clamped_up() {
        let response: PlanResponse =
            serde_json::from_str(&plan_json(vec![wire_exercise("A", "beginner")], 1)).unwrap();
        let plan = build_model_plan(response, &analysis(&[], "sedentary"), Utc::now()).unwrap();
        assert_eq!(plan.total_weeks, MIN_TOTAL_WEEKS);
    }

    #[test]
    fn empty_model_plan_is_rejected() {
        let response: PlanResponse = serde_json::from_str(&plan_json(vec![], 6)).unwrap();
        let err = build_model_plan(response, &analysis(&[], "sedentary"), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoContent);
    }

    #[test]
    fn fallback_plan_uses_catalog_and_fixed_shape() {
        let plan = build_fallback_plan(&analysis(&["Herniated Disc"], "Moderately Active"), Utc::now());
        assert_eq!(plan.plan_name, FALLBACK_PLAN_NAME);
        assert_eq!(plan.total_weeks, 4);
        assert!(plan.notes.is_none());
        let names: Vec<_> = plan.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Pelvic Tilts", "Child's Pose"]);
        assert_eq!(plan.active_days(), 4);
    }

    #[tokio::test]
    async fn model_path_success() {
        let reply = plan_json(vec![wire_exercise("Quad Sets", "beginner")], 6);
        let (planner, client) = generator(vec![MockReply::Text(reply)], PlanOptions::default());
        planner.generate(analysis(&["Patellofemoral Pain Syndrome"], "sedentary"));
        let state = settle(&planner).await;
        let outcome = state.outcome().expect("succeeded");
        assert_eq!(outcome.source, PlanSource::Model);
        assert_eq!(outcome.plan.plan_name, "Knee Recovery");
        assert_eq!(outcome.plan.total_weeks, 6);
        assert!(client.calls()[0].user_message.contains("Patellofemoral Pain Syndrome (Confidence: 80%)"));
    }

    #[tokio::test]
    async fn failed_model_path_falls_back_to_catalog() {
        let (planner, _) = generator(vec![MockReply::Timeout], PlanOptions::default());
        planner.generate(analysis(&["Rotator Cuff Strain"], "very active"));
        let state = settle(&planner).await;
        let outcome = state.outcome().expect("fallback plan");
        match &outcome.source {
            PlanSource::Fallback { notice } => assert_eq!(notice.kind, FailureKind::Network),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(outcome.plan.exercises.len(), 4);
        assert_eq!(outcome.plan.active_days(), 5);
    }

    #[tokio::test]
    async fn partially_valid_model_output_never_leaks_into_fallback() {
        let truncated = r#"{"planName":"Half","exercises":[{"name":"Mystery Move","targetArea":"Knee"}"#;
        let (planner, _) = generator(vec![MockReply::text(truncated)], PlanOptions::default());
        planner.generate(analysis(&["Unlisted Condition"], "sedentary"));
        let state = settle(&planner).await;
        let outcome = state.outcome().unwrap();
        assert!(outcome.is_fallback());
        let names: Vec<_> = outcome.plan.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Gentle Stretching", "Walking"]);
    }

    #[tokio::test]
    async fn fallback_disabled_surfaces_failure() {
        let options = PlanOptions {
            fallback_enabled: false,
        };
        let (planner, _) = generator(vec![MockReply::RateLimited], options);
        planner.generate(analysis(&["Meniscus Tear"], "sedentary"));
        match settle(&planner).await {
            PlanState::Failed(notice) => assert_eq!(notice.kind, FailureKind::RateLimited),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn regenerate_retries_model_path() {
        let good = plan_json(vec![wire_exercise("Heel Slides", "beginner")], 5);
        let (planner, client) = generator(
            vec![MockReply::Status(503, String::new()), MockReply::Text(good)],
            PlanOptions::default(),
        );
        planner.generate(analysis(&["Meniscus Tear"], "sedentary"));
        assert!(settle(&planner).await.outcome().unwrap().is_fallback());

        assert!(planner.regenerate());
        let state = settle(&planner).await;
        assert_eq!(state.outcome().unwrap().source, PlanSource::Model);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn regenerate_without_analysis_is_rejected() {
        let (planner, _) = generator(vec![MockReply::NoContent], PlanOptions::default());
        assert!(!planner.regenerate());
        assert_eq!(planner.state(), PlanState::Idle);
    }

    #[tokio::test]
    async fn cancel_drops_late_plan() {
        let good = plan_json(vec![wire_exercise("Heel Slides", "beginner")], 5);
        let (planner, client) = generator(
            vec![MockReply::Delayed(Duration::from_millis(100), good)],
            PlanOptions::default(),
        );
        planner.generate(analysis(&["Meniscus Tear"], "sedentary"));
        tokio::time::timeout(Duration::from_secs(2), async {
            while client.call_count() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert!(planner.cancel());
        assert_eq!(planner.state(), PlanState::Cancelled);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(planner.state(), PlanState::Cancelled);
        assert!(!planner.cancel());
    }

    #[tokio::test]
    async fn plan_is_persisted() {
        let client = Arc::new(MockReasoningClient::always(MockReply::Timeout));
        let store = Arc::new(MemoryStore::default());
        let planner = PlanGenerator::with_store(client, PlanOptions::default(), store.clone());
        planner.generate(analysis(&["ACL Sprain"], "sedentary"));
        let state = settle(&planner).await;
        let id = state.outcome().unwrap().plan.id;

        tokio::time::timeout(Duration::from_secs(2), async {
            while store.plans().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("plan not persisted");
        assert_eq!(store.plans()[0].id, id);
    }
}
