//! Fixed sample records.
//!
//! Five hand-written resources covering every populated processing state, a shared patient and
//! both present and absent optional fields. Used by the `sample` record source and tests.

use crate::{
    EhrResource, FhirVersion, ProcessingState, ResourceIdentifier, ResourceMetadata,
    ResourceWrapper,
};
use chrono::{DateTime, TimeZone, Utc};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    state: ProcessingState,
    created: DateTime<Utc>,
    fetched: DateTime<Utc>,
    processed: Option<DateTime<Utc>>,
    (key, uid, patient_id): (&str, &str, &str),
    resource_type: &str,
    version: FhirVersion,
    description: &str,
    summary: Option<&str>,
) -> ResourceWrapper {
    ResourceWrapper {
        resource: EhrResource {
            metadata: ResourceMetadata {
                state,
                created_time: created,
                fetch_time: fetched,
                processed_time: processed,
                identifier: ResourceIdentifier {
                    key: key.into(),
                    uid: uid.into(),
                    patient_id: patient_id.into(),
                },
                resource_type: resource_type.into(),
                version,
            },
            human_readable_str: description.into(),
            ai_summary: summary.map(Into::into),
        },
    }
}

/// Returns the fixed sample set.
pub fn sample_resources() -> Vec<ResourceWrapper> {
    vec![
        sample(
            ProcessingState::Completed,
            at(2024, 1, 15, 10, 30),
            at(2024, 1, 15, 10, 35),
            Some(at(2024, 1, 15, 10, 40)),
            ("patient-001-observation-001", "obs-12345", "patient-001"),
            "Observation",
            FhirVersion::R4,
            "Blood pressure measurement: 120/80 mmHg recorded on January 15, 2024",
            Some("Normal blood pressure reading within healthy range for adult patient."),
        ),
        sample(
            ProcessingState::Processing,
            at(2024, 1, 16, 9, 15),
            at(2024, 1, 16, 9, 20),
            None,
            ("patient-002-medication-001", "med-67890", "patient-002"),
            "MedicationRequest",
            FhirVersion::R4,
            "Prescription for Lisinopril 10mg once daily for hypertension management",
            None,
        ),
        sample(
            ProcessingState::Failed,
            at(2024, 1, 17, 14, 22),
            at(2024, 1, 17, 14, 25),
            None,
            ("patient-003-allergy-001", "allergy-54321", "patient-003"),
            "AllergyIntolerance",
            FhirVersion::R4B,
            "Patient reported allergy to penicillin with severe reaction history",
            None,
        ),
        sample(
            ProcessingState::NotStarted,
            at(2024, 1, 18, 11, 45),
            at(2024, 1, 18, 11, 50),
            None,
            ("patient-001-lab-001", "lab-98765", "patient-001"),
            "DiagnosticReport",
            FhirVersion::R4,
            "Complete blood count (CBC) laboratory results pending analysis",
            None,
        ),
        sample(
            ProcessingState::Completed,
            at(2024, 1, 19, 16, 30),
            at(2024, 1, 19, 16, 35),
            Some(at(2024, 1, 19, 16, 45)),
            ("patient-004-condition-001", "cond-11111", "patient-004"),
            "Condition",
            FhirVersion::R4,
            "Diagnosed with Type 2 Diabetes Mellitus, well-controlled with medication",
            Some(
                "Chronic condition managed with metformin therapy, patient shows good \
                 compliance and stable glucose levels.",
            ),
        ),
    ]
}
