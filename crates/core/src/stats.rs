//! Summary figures for the dashboard header cards.

use ehr_resource::{ProcessingState, ResourceWrapper};
use std::collections::HashSet;

/// Counts per processing state plus collection-wide figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub completed: usize,
    pub processing: usize,
    pub failed: usize,
    pub not_started: usize,
    pub total: usize,
    pub unique_patients: usize,
}

impl ResourceStats {
    pub fn from_records(records: &[ResourceWrapper]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        let mut patients = HashSet::new();

        for record in records {
            match record.state() {
                ProcessingState::Completed => stats.completed += 1,
                ProcessingState::Processing => stats.processing += 1,
                ProcessingState::Failed => stats.failed += 1,
                ProcessingState::NotStarted => stats.not_started += 1,
                ProcessingState::Unspecified => {}
            }
            patients.insert(record.patient_id());
        }

        stats.unique_patients = patients.len();
        stats
    }

    /// Completed share of all records, rounded to a whole percent. Zero for an empty set.
    pub fn success_rate(&self) -> u8 {
        let rate = self.completed as f64 / self.total.max(1) as f64 * 100.0;
        rate.round() as u8
    }
}
