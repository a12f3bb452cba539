//! End-to-end orchestrator runs against in-memory fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;

use drowse_clients::{
    ChatParams, GenerationServices, ImageGenerator, ObjectStore, SpeechSynthesizer, TextGenerator,
};
use drowse_core::error::CoreError;
use drowse_core::step::GenerationStep;
use drowse_core::types::DbId;
use drowse_db::models::asset::NewGeneratedAsset;
use drowse_db::models::job::Job;
use drowse_db::models::status::{JobStatus, StepStatus};
use drowse_notify::Notifier;
use drowse_pipeline::{JobOrchestrator, PipelineStore};

// --- Fake persistence ---

#[derive(Default)]
struct StoreState {
    job_status: Option<JobStatus>,
    transitions: HashMap<&'static str, Vec<StepStatus>>,
    step_errors: HashMap<&'static str, Vec<String>>,
    attempts: HashMap<&'static str, u32>,
    asset: Option<NewGeneratedAsset>,
    job_error: Option<String>,
}

#[derive(Default)]
struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    fn with_pending_job() -> Self {
        let store = Self::default();
        store.state.lock().unwrap().job_status = Some(JobStatus::Pending);
        store
    }

    fn transitions(&self, step: GenerationStep) -> Vec<StepStatus> {
        self.state
            .lock()
            .unwrap()
            .transitions
            .get(step.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PipelineStore for FakeStore {
    async fn claim_job(&self, job_id: DbId) -> Result<Option<Job>, CoreError> {
        let mut state = self.state.lock().unwrap();
        if state.job_status == Some(JobStatus::Pending) {
            state.job_status = Some(JobStatus::Processing);
            Ok(Some(test_job(job_id)))
        } else {
            Ok(None)
        }
    }

    async fn init_steps(&self, _job_id: DbId) -> Result<(), CoreError> {
        Ok(())
    }

    async fn step_update(
        &self,
        _job_id: DbId,
        step: GenerationStep,
        status: StepStatus,
        error: Option<&str>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.transitions.entry(step.as_str()).or_default().push(status);
        if let Some(error) = error {
            state
                .step_errors
                .entry(step.as_str())
                .or_default()
                .push(error.to_string());
        }
    }

    async fn record_attempts(&self, _job_id: DbId, step: GenerationStep, attempts: u32) {
        self.state
            .lock()
            .unwrap()
            .attempts
            .insert(step.as_str(), attempts);
    }

    async fn save_asset(&self, asset: &NewGeneratedAsset) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if state.asset.is_some() {
            return Err(CoreError::Persistence("duplicate asset row".into()));
        }
        state.asset = Some(asset.clone());
        Ok(())
    }

    async fn complete_job(&self, _job_id: DbId) -> Result<(), CoreError> {
        self.state.lock().unwrap().job_status = Some(JobStatus::Completed);
        Ok(())
    }

    async fn fail_job(&self, _job_id: DbId, error: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.job_status = Some(JobStatus::Failed);
        state.job_error = Some(error.to_string());
        Ok(())
    }
}

// --- Fake services ---

/// Remaining failures per call kind; a call fails while its counter
/// is positive, then succeeds.
#[derive(Default)]
struct Failures {
    story: AtomicU32,
    metadata: AtomicU32,
    images: AtomicU32,
    speech: AtomicU32,
    artwork_text: AtomicU32,
}

impl Failures {
    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

struct FakeText {
    failures: Arc<Failures>,
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn complete(
        &self,
        system_prompt: &str,
        _user_prompt: &str,
        _params: ChatParams,
    ) -> Result<String, CoreError> {
        if system_prompt.contains("narrator") {
            if Failures::take(&self.failures.story) {
                return Err(CoreError::Service {
                    status: 500,
                    body: "story upstream error".into(),
                });
            }
            Ok("Once, a quiet river.\n[soft chimes]\nIt carried you home.".into())
        } else if system_prompt.contains("metadata specialist") {
            if Failures::take(&self.failures.metadata) {
                return Err(CoreError::Service {
                    status: 500,
                    body: "metadata upstream error".into(),
                });
            }
            Ok(r#"{"title":"The Quiet River","description":"A slow drift toward sleep."}"#.into())
        } else {
            if Failures::take(&self.failures.artwork_text) {
                return Err(CoreError::Service {
                    status: 500,
                    body: "artwork upstream error".into(),
                });
            }
            Ok("A small boat under lantern light on a wide, calm river.".into())
        }
    }
}

struct FakeImages {
    failures: Arc<Failures>,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_png(&self, _prompt: &str) -> Result<Vec<u8>, CoreError> {
        if Failures::take(&self.failures.images) {
            return Err(CoreError::Service {
                status: 502,
                body: "image upstream error".into(),
            });
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

struct FakeSpeech {
    failures: Arc<Failures>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, CoreError> {
        if Failures::take(&self.failures.speech) {
            return Err(CoreError::Service {
                status: 503,
                body: "speech upstream error".into(),
            });
        }
        Ok(vec![0xFF, 0xFB])
    }
}

#[derive(Default)]
struct FakeObjectStore;

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(
        &self,
        key: &str,
        _body: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, CoreError> {
        Ok(format!("https://cdn.test/{key}"))
    }

    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, CoreError> {
        Ok(Vec::new())
    }
}

// --- Fake notifier ---

#[derive(Default)]
struct FakeNotifier {
    completions: Mutex<Vec<(String, String)>>,
    failures: Mutex<Vec<String>>,
    fail_sends: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify_completion(&self, phone: &str, job_token: &str) -> Result<(), CoreError> {
        self.completions
            .lock()
            .unwrap()
            .push((phone.to_string(), job_token.to_string()));
        if self.fail_sends {
            return Err(CoreError::Service {
                status: 500,
                body: "sms down".into(),
            });
        }
        Ok(())
    }

    async fn notify_failure(&self, phone: &str) -> Result<(), CoreError> {
        self.failures.lock().unwrap().push(phone.to_string());
        if self.fail_sends {
            return Err(CoreError::Service {
                status: 500,
                body: "sms down".into(),
            });
        }
        Ok(())
    }

    async fn notify_payment(&self, _phone: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

// --- Harness ---

fn test_job(id: DbId) -> Job {
    Job {
        id,
        token: "2026-08-29-luna-x7k2mq".into(),
        status_id: JobStatus::Processing.id(),
        customization: serde_json::json!({ "characterName": "Luna" }),
        phone_number: Some("+15551234567".into()),
        sms_consent: true,
        payment_session_id: None,
        error_message: None,
        created_at: chrono::Utc::now(),
        started_at: Some(chrono::Utc::now()),
        completed_at: None,
    }
}

fn services(failures: Arc<Failures>) -> GenerationServices {
    GenerationServices {
        text: Arc::new(FakeText {
            failures: failures.clone(),
        }),
        images: Arc::new(FakeImages {
            failures: failures.clone(),
        }),
        speech: Arc::new(FakeSpeech { failures }),
        store: Arc::new(FakeObjectStore),
    }
}

struct Harness {
    store: Arc<FakeStore>,
    notifier: Arc<FakeNotifier>,
    orchestrator: JobOrchestrator,
}

fn harness(failures: Failures, notifier: FakeNotifier) -> Harness {
    let store = Arc::new(FakeStore::with_pending_job());
    let notifier = Arc::new(notifier);
    let orchestrator = JobOrchestrator::new(
        store.clone(),
        services(Arc::new(failures)),
        notifier.clone(),
    );
    Harness {
        store,
        notifier,
        orchestrator,
    }
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn happy_path_completes_job_and_saves_asset() {
    let h = harness(Failures::default(), FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    h.orchestrator.run(&job).await.unwrap();

    let state = h.store.state.lock().unwrap();
    assert_eq!(state.job_status, Some(JobStatus::Completed));
    let asset = state.asset.as_ref().unwrap();
    assert_eq!(asset.title, "The Quiet River");
    assert_eq!(asset.story_text, "Once, a quiet river.\nIt carried you home.");
    assert!(asset.artwork_url.starts_with("https://cdn.test/sleep-stories/"));
    assert!(asset.audio_url.ends_with("/audio.mp3"));
    drop(state);

    for step in GenerationStep::ALL {
        assert_eq!(
            h.store.transitions(step),
            vec![StepStatus::Running, StepStatus::Completed]
        );
    }
    assert_eq!(h.notifier.completions.lock().unwrap().len(), 1);
    assert!(h.notifier.failures.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn claim_succeeds_exactly_once() {
    let h = harness(Failures::default(), FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    assert_eq!(job.id, 1);

    let second = h.orchestrator.claim(1).await;
    assert_matches!(second, Err(CoreError::Precondition(_)));
}

#[tokio::test(start_paused = true)]
async fn story_exhaustion_fails_job_without_running_dependents() {
    let failures = Failures {
        story: AtomicU32::new(u32::MAX),
        ..Default::default()
    };
    let h = harness(failures, FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    let err = h.orchestrator.run(&job).await.unwrap_err();
    assert_matches!(err, CoreError::RetryExhausted { attempts: 3, .. });

    let state = h.store.state.lock().unwrap();
    assert_eq!(state.job_status, Some(JobStatus::Failed));
    assert_eq!(
        state.job_error.as_deref(),
        Some("Service error: HTTP 500 - story upstream error")
    );
    assert!(state.asset.is_none());
    assert_eq!(state.attempts.get(GenerationStep::Story.as_str()), Some(&3));
    drop(state);

    // Story ran three attempts; the dependent steps never started.
    assert_eq!(h.store.transitions(GenerationStep::Story).len(), 6);
    for step in GenerationStep::PARALLEL {
        assert!(h.store.transitions(step).is_empty());
    }
    assert_eq!(h.notifier.failures.lock().unwrap().len(), 1);
    assert!(h.notifier.completions.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transient_story_failure_recovers_on_retry() {
    let failures = Failures {
        story: AtomicU32::new(1),
        ..Default::default()
    };
    let h = harness(failures, FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    h.orchestrator.run(&job).await.unwrap();

    assert_eq!(
        h.store.transitions(GenerationStep::Story),
        vec![
            StepStatus::Running,
            StepStatus::Failed,
            StepStatus::Running,
            StepStatus::Completed
        ]
    );
    let state = h.store.state.lock().unwrap();
    assert_eq!(state.job_status, Some(JobStatus::Completed));
    assert!(state.asset.is_some());
}

#[tokio::test(start_paused = true)]
async fn parallel_failure_fails_job_but_siblings_finish() {
    let failures = Failures {
        speech: AtomicU32::new(u32::MAX),
        ..Default::default()
    };
    let h = harness(failures, FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    let err = h.orchestrator.run(&job).await.unwrap_err();
    assert_matches!(err, CoreError::RetryExhausted { .. });

    let state = h.store.state.lock().unwrap();
    assert_eq!(state.job_status, Some(JobStatus::Failed));
    assert_eq!(
        state.job_error.as_deref(),
        Some("Service error: HTTP 503 - speech upstream error")
    );
    // No partial asset row for a failed job.
    assert!(state.asset.is_none());
    drop(state);

    // The sibling steps still ran to completion.
    assert_eq!(
        h.store.transitions(GenerationStep::Metadata),
        vec![StepStatus::Running, StepStatus::Completed]
    );
    assert_eq!(
        h.store.transitions(GenerationStep::Artwork),
        vec![StepStatus::Running, StepStatus::Completed]
    );
}

#[tokio::test(start_paused = true)]
async fn metadata_error_wins_when_multiple_parallel_steps_fail() {
    let failures = Failures {
        metadata: AtomicU32::new(u32::MAX),
        speech: AtomicU32::new(u32::MAX),
        ..Default::default()
    };
    let h = harness(failures, FakeNotifier::default());

    let job = h.orchestrator.claim(1).await.unwrap();
    let err = h.orchestrator.run(&job).await.unwrap_err();
    assert_eq!(err.root_message(), "Service error: HTTP 500 - metadata upstream error");

    let state = h.store.state.lock().unwrap();
    assert_eq!(
        state.job_error.as_deref(),
        Some("Service error: HTTP 500 - metadata upstream error")
    );
    assert_eq!(
        state.attempts.get(GenerationStep::Metadata.as_str()),
        Some(&3)
    );
    assert_eq!(state.attempts.get(GenerationStep::Audio.as_str()), Some(&3));
}

#[tokio::test(start_paused = true)]
async fn notifier_failure_does_not_change_job_outcome() {
    let h = harness(
        Failures::default(),
        FakeNotifier {
            fail_sends: true,
            ..Default::default()
        },
    );

    let job = h.orchestrator.claim(1).await.unwrap();
    h.orchestrator.run(&job).await.unwrap();

    let state = h.store.state.lock().unwrap();
    assert_eq!(state.job_status, Some(JobStatus::Completed));
    drop(state);
    assert_eq!(h.notifier.completions.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_sms_without_consent() {
    let h = harness(Failures::default(), FakeNotifier::default());

    let mut job = h.orchestrator.claim(1).await.unwrap();
    job.sms_consent = false;
    h.orchestrator.run(&job).await.unwrap();

    assert!(h.notifier.completions.lock().unwrap().is_empty());
    assert!(h.notifier.failures.lock().unwrap().is_empty());
}
