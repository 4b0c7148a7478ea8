//! Synthetic resource record generation.
//!
//! Produces up to [`MAX_RECORD_COUNT`] records with randomised field values. No seeding or
//! determinism is offered: two calls never share state.
//!
//! [`generate_with_progress`] is the cooperative variant. It reports progress roughly every 1 %
//! of the work and yields to the async scheduler after each report, so a single-threaded caller
//! can repaint between checkpoints. It always finishes by reporting exactly `100`, and stops early
//! with [`DashError::Cancelled`] when its [`CancelFlag`] is raised.

use crate::constants::{MAX_RECORD_COUNT, PROGRESS_STEPS};
use crate::{DashError, DashResult};
use chrono::{DateTime, Duration, Utc};
use ehr_resource::{
    EhrResource, FhirVersion, ProcessingState, ResourceIdentifier, ResourceMetadata,
    ResourceWrapper,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const DESCRIPTIONS: [&str; 10] = [
    "Blood pressure reading: 120/80 mmHg, heart rate 72 bpm, normal sinus rhythm",
    "Prescribed Metformin 500mg twice daily for Type 2 diabetes management",
    "Patient reports penicillin allergy with previous anaphylactic reaction",
    "Complete blood count shows normal white cell count, hemoglobin 13.5 g/dL",
    "Chest X-ray reveals clear lungs, no acute cardiopulmonary process",
    "Annual wellness visit: BMI 24.2, all vital signs within normal limits",
    "Flu vaccination administered, patient tolerated well, no adverse reactions",
    "MRI brain shows no acute abnormalities, follow-up in 6 months recommended",
    "Colonoscopy completed, 2 small polyps removed and sent for pathology",
    "Patient counseled on smoking cessation, nicotine replacement therapy initiated",
];

pub(crate) const AI_SUMMARIES: [&str; 10] = [
    "Normal vital signs indicate stable cardiovascular health",
    "Medication therapy appropriately managed with good patient compliance",
    "Critical allergy information documented for safe care coordination",
    "Laboratory values within expected range for patient demographics",
    "Imaging results support continued conservative management approach",
    "Preventive care measures completed per clinical guidelines",
    "Vaccination status updated, patient protected against seasonal influenza",
    "Follow-up imaging recommended to monitor previous findings",
    "Routine screening completed with appropriate therapeutic intervention",
    "Patient education provided with evidence-based treatment plan",
];

pub(crate) const RESOURCE_TYPES: [&str; 8] = [
    "Observation",
    "MedicationRequest",
    "AllergyIntolerance",
    "DiagnosticReport",
    "Condition",
    "Patient",
    "Encounter",
    "Procedure",
];

/// States assigned to generated records. `Unspecified` is never generated.
pub(crate) const GENERATED_STATES: [ProcessingState; 4] = [
    ProcessingState::Completed,
    ProcessingState::Processing,
    ProcessingState::Failed,
    ProcessingState::NotStarted,
];

/// Smallest patient id pool; larger runs widen it to about two resources per patient.
const MIN_PATIENT_POOL: u64 = 100_000;

const AI_SUMMARY_PROBABILITY: f64 = 0.6;

/// Shared cancellation signal for a generation run.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Lower the flag so the same handle can drive another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Clamp a requested record count to [`MAX_RECORD_COUNT`].
pub fn clamp_count(count: usize) -> usize {
    count.min(MAX_RECORD_COUNT)
}

/// A random instant within `window` before `now`.
pub(crate) fn recent<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    window: Duration,
) -> DateTime<Utc> {
    let window_ms = window.num_milliseconds().max(1);
    now - Duration::milliseconds(rng.gen_range(0..window_ms))
}

pub(crate) fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub(crate) fn random_version<R: Rng + ?Sized>(rng: &mut R) -> FhirVersion {
    if rng.gen_bool(0.5) {
        FhirVersion::R4
    } else {
        FhirVersion::R4B
    }
}

pub(crate) fn pick<'a, R: Rng + ?Sized, T>(rng: &mut R, pool: &'a [T]) -> &'a T {
    // Pools are non-empty constants.
    &pool[rng.gen_range(0..pool.len())]
}

/// Builds records for one run; fixes the clock and patient pool up front.
struct RecordFactory {
    now: DateTime<Utc>,
    max_patient_id: u64,
}

impl RecordFactory {
    fn new(count: usize) -> Self {
        Self {
            now: Utc::now(),
            max_patient_id: MIN_PATIENT_POOL.max(count as u64 / 2),
        }
    }

    fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> ResourceWrapper {
        let state = *pick(rng, &GENERATED_STATES);
        let processed_time = if state == ProcessingState::Completed {
            Some(recent(rng, self.now, Duration::days(3)))
        } else {
            None
        };
        let ai_summary = rng
            .gen_bool(AI_SUMMARY_PROBABILITY)
            .then(|| pick(rng, &AI_SUMMARIES).to_string());

        ResourceWrapper {
            resource: EhrResource {
                metadata: ResourceMetadata {
                    state,
                    created_time: recent(rng, self.now, Duration::days(30)),
                    fetch_time: recent(rng, self.now, Duration::days(7)),
                    processed_time,
                    identifier: ResourceIdentifier {
                        key: Uuid::new_v4().to_string(),
                        uid: random_alphanumeric(rng, 12),
                        patient_id: format!(
                            "patient-{}",
                            rng.gen_range(1..=self.max_patient_id)
                        ),
                    },
                    resource_type: pick(rng, &RESOURCE_TYPES).to_string(),
                    version: random_version(rng),
                },
                human_readable_str: pick(rng, &DESCRIPTIONS).to_string(),
                ai_summary,
            },
        }
    }

    fn fill(&self, out: &mut Vec<ResourceWrapper>, n: usize) {
        let mut rng = rand::thread_rng();
        out.extend((0..n).map(|_| self.build(&mut rng)));
    }
}

/// Generate `count` records (clamped to [`MAX_RECORD_COUNT`]) in one go.
pub fn generate(count: usize) -> Vec<ResourceWrapper> {
    let count = clamp_count(count);
    let factory = RecordFactory::new(count);
    let mut records = Vec::with_capacity(count);
    factory.fill(&mut records, count);
    records
}

/// Generate `count` records (clamped to [`MAX_RECORD_COUNT`]), reporting progress.
///
/// `on_progress` receives a non-decreasing percentage after each checkpoint and exactly `100`
/// once on completion. Control is yielded to the scheduler after every checkpoint.
///
/// # Errors
///
/// Returns [`DashError::Cancelled`] if `cancel` is raised before the run completes.
pub async fn generate_with_progress<F>(
    count: usize,
    mut on_progress: F,
    cancel: &CancelFlag,
) -> DashResult<Vec<ResourceWrapper>>
where
    F: FnMut(u8),
{
    let count = clamp_count(count);
    let factory = RecordFactory::new(count);
    let chunk = count.div_ceil(PROGRESS_STEPS).max(1);
    let mut records = Vec::with_capacity(count);

    tracing::debug!(count, chunk, "generating resource records");

    while records.len() < count {
        if cancel.is_cancelled() {
            tracing::info!(done = records.len(), count, "generation cancelled");
            return Err(DashError::Cancelled);
        }

        let step = chunk.min(count - records.len());
        factory.fill(&mut records, step);

        if records.len() < count {
            on_progress((records.len() * 100 / count) as u8);
            tokio::task::yield_now().await;
        }
    }

    if cancel.is_cancelled() {
        return Err(DashError::Cancelled);
    }

    on_progress(100);
    Ok(records)
}
