//! Resource record domain types and JSON translation helpers.
//!
//! Responsibilities:
//! - Define the record types displayed by the dashboard
//! - Match the record source wire format (camelCase keys, `PROCESSING_STATE_*` enum names)
//! - Decode tolerantly: missing optional fields and unknown enum names are valid data
//!
//! Notes:
//! - `processed_time` is normally present only for completed records, but nothing here enforces
//!   that; consumers must render its absence as "pending" regardless of state.

use crate::{ResourceError, ResourceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Processing lifecycle label of a record.
///
/// This is display data fixed at creation time, not a live state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum ProcessingState {
    #[default]
    #[serde(rename = "PROCESSING_STATE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PROCESSING_STATE_NOT_STARTED")]
    NotStarted,
    #[serde(rename = "PROCESSING_STATE_PROCESSING")]
    Processing,
    #[serde(rename = "PROCESSING_STATE_COMPLETED")]
    Completed,
    #[serde(rename = "PROCESSING_STATE_FAILED")]
    Failed,
}

impl ProcessingState {
    /// Every state, in declaration order.
    pub const ALL: [ProcessingState; 5] = [
        ProcessingState::Unspecified,
        ProcessingState::NotStarted,
        ProcessingState::Processing,
        ProcessingState::Completed,
        ProcessingState::Failed,
    ];

    /// The name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            ProcessingState::Unspecified => "PROCESSING_STATE_UNSPECIFIED",
            ProcessingState::NotStarted => "PROCESSING_STATE_NOT_STARTED",
            ProcessingState::Processing => "PROCESSING_STATE_PROCESSING",
            ProcessingState::Completed => "PROCESSING_STATE_COMPLETED",
            ProcessingState::Failed => "PROCESSING_STATE_FAILED",
        }
    }

    /// Human-facing badge label.
    pub fn label(self) -> &'static str {
        match self {
            ProcessingState::Unspecified => "Unknown",
            ProcessingState::NotStarted => "Not Started",
            ProcessingState::Processing => "Processing",
            ProcessingState::Completed => "Completed",
            ProcessingState::Failed => "Failed",
        }
    }

    /// Map a wire name onto a state. Unrecognised names become [`ProcessingState::Unspecified`].
    pub fn from_wire(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|state| state.wire_name() == name)
            .unwrap_or_default()
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProcessingState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&name))
    }
}

/// FHIR release a record was captured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum FhirVersion {
    #[default]
    #[serde(rename = "FHIR_VERSION_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "FHIR_VERSION_R4")]
    R4,
    #[serde(rename = "FHIR_VERSION_R4B")]
    R4B,
}

impl FhirVersion {
    pub const ALL: [FhirVersion; 3] = [FhirVersion::Unspecified, FhirVersion::R4, FhirVersion::R4B];

    pub fn wire_name(self) -> &'static str {
        match self {
            FhirVersion::Unspecified => "FHIR_VERSION_UNSPECIFIED",
            FhirVersion::R4 => "FHIR_VERSION_R4",
            FhirVersion::R4B => "FHIR_VERSION_R4B",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FhirVersion::Unspecified => "Unspecified",
            FhirVersion::R4 => "R4",
            FhirVersion::R4B => "R4B",
        }
    }

    /// Map a wire name onto a version. Unrecognised names become [`FhirVersion::Unspecified`].
    pub fn from_wire(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|version| version.wire_name() == name)
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for FhirVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&name))
    }
}

/// Composite key of a record.
///
/// `key` and `uid` are unique per record; `patient_id` is shared by every resource belonging
/// to the same patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceIdentifier {
    pub key: String,
    pub uid: String,
    pub patient_id: String,
}

/// Processing metadata carried by every record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub state: ProcessingState,
    pub created_time: DateTime<Utc>,
    pub fetch_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_time: Option<DateTime<Utc>>,
    pub identifier: ResourceIdentifier,
    pub resource_type: String,
    pub version: FhirVersion,
}

/// One EHR resource: metadata plus descriptive text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EhrResource {
    pub metadata: ResourceMetadata,
    pub human_readable_str: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// Envelope used by the record source; one per row in the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResourceWrapper {
    pub resource: EhrResource,
}

impl ResourceWrapper {
    pub fn metadata(&self) -> &ResourceMetadata {
        &self.resource.metadata
    }

    pub fn patient_id(&self) -> &str {
        &self.resource.metadata.identifier.patient_id
    }

    pub fn state(&self) -> ProcessingState {
        self.resource.metadata.state
    }

    pub fn description(&self) -> &str {
        &self.resource.human_readable_str
    }

    pub fn ai_summary(&self) -> Option<&str> {
        self.resource.ai_summary.as_deref()
    }
}

// ============================================================================
// Public Resources operations
// ============================================================================

/// Resource collection translation.
///
/// Zero-sized type used for namespacing JSON operations on whole record collections.
pub struct Resources;

impl Resources {
    /// Parse a JSON array of records.
    ///
    /// This uses `serde_path_to_error` so a mismatch reports where it happened, for example
    /// `[3].resource.metadata.createdTime`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Translation`] if the payload is not an array of records.
    pub fn parse(json: &[u8]) -> ResourceResult<Vec<ResourceWrapper>> {
        let mut deserializer = serde_json::Deserializer::from_slice(json);

        let records = match serde_path_to_error::deserialize::<_, Vec<ResourceWrapper>>(
            &mut deserializer,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(ResourceError::Translation(format!(
                    "resource payload mismatch at {path}: {source}"
                )));
            }
        };

        deserializer.end()?;
        Ok(records)
    }

    /// Render records as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidJson`] if serialisation fails.
    pub fn render(records: &[ResourceWrapper]) -> ResourceResult<String> {
        Ok(serde_json::to_string(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = r#"[
  {
    "resource": {
      "metadata": {
        "state": "PROCESSING_STATE_COMPLETED",
        "createdTime": "2024-01-15T10:30:00Z",
        "fetchTime": "2024-01-15T10:35:00Z",
        "processedTime": "2024-01-15T10:40:00Z",
        "identifier": { "key": "patient-001-observation-001", "uid": "obs-12345", "patientId": "patient-001" },
        "resourceType": "Observation",
        "version": "FHIR_VERSION_R4"
      },
      "humanReadableStr": "Blood pressure measurement: 120/80 mmHg",
      "aiSummary": "Normal blood pressure reading."
    }
  },
  {
    "resource": {
      "metadata": {
        "state": "PROCESSING_STATE_PROCESSING",
        "createdTime": "2024-01-16T09:15:00Z",
        "fetchTime": "2024-01-16T09:20:00Z",
        "identifier": { "key": "patient-002-medication-001", "uid": "med-67890", "patientId": "patient-002" },
        "resourceType": "MedicationRequest",
        "version": "FHIR_VERSION_R4B"
      },
      "humanReadableStr": "Prescription for Lisinopril 10mg"
    }
  }
]"#;

    #[test]
    fn parses_camel_case_payload() {
        let records = Resources::parse(TWO_RECORDS.as_bytes()).expect("parse records");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.state(), ProcessingState::Completed);
        assert_eq!(first.patient_id(), "patient-001");
        assert_eq!(first.metadata().version, FhirVersion::R4);
        assert!(first.metadata().processed_time.is_some());
        assert_eq!(first.ai_summary(), Some("Normal blood pressure reading."));

        let second = &records[1];
        assert_eq!(second.state(), ProcessingState::Processing);
        assert_eq!(second.metadata().version, FhirVersion::R4B);
        assert!(second.metadata().processed_time.is_none());
        assert!(second.ai_summary().is_none());
    }

    #[test]
    fn unknown_enum_names_decode_as_unspecified() {
        let input = TWO_RECORDS
            .replace("PROCESSING_STATE_COMPLETED", "PROCESSING_STATE_ARCHIVED")
            .replace("FHIR_VERSION_R4B", "FHIR_VERSION_R5");
        let records = Resources::parse(input.as_bytes()).expect("parse records");
        assert_eq!(records[0].state(), ProcessingState::Unspecified);
        assert_eq!(records[1].metadata().version, FhirVersion::Unspecified);
    }

    #[test]
    fn mismatch_reports_field_path() {
        let input = TWO_RECORDS.replace("\"2024-01-16T09:15:00Z\"", "12");
        let err = Resources::parse(input.as_bytes()).expect_err("should reject bad timestamp");
        match err {
            ResourceError::Translation(msg) => {
                assert!(msg.contains("[1].resource.metadata.createdTime"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = Resources::parse(br#"{"resource": {}}"#).expect_err("should reject object");
        assert!(matches!(err, ResourceError::Translation(_)));
    }

    #[test]
    fn render_omits_absent_optionals() {
        let records = Resources::parse(TWO_RECORDS.as_bytes()).expect("parse records");
        let output = Resources::render(&records[1..]).expect("render records");
        assert!(output.contains("\"patientId\":\"patient-002\""));
        assert!(output.contains("\"state\":\"PROCESSING_STATE_PROCESSING\""));
        assert!(!output.contains("processedTime"));
        assert!(!output.contains("aiSummary"));
    }

    #[test]
    fn labels_cover_every_state() {
        let labels: Vec<&str> = ProcessingState::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            ["Unknown", "Not Started", "Processing", "Completed", "Failed"]
        );
        for state in ProcessingState::ALL {
            assert_eq!(ProcessingState::from_wire(state.wire_name()), state);
        }
    }
}
