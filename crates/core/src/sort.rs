//! Column sorting for the resource table.
//!
//! One column sorts at a time. Clicking a header sorts that column ascending unless it is already
//! ascending, in which case it flips to descending.

use crate::{DashError, DashResult};
use ehr_resource::ResourceWrapper;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sortable table columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortColumn {
    PatientId,
    ResourceType,
    State,
    Created,
    Fetched,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::PatientId,
        SortColumn::ResourceType,
        SortColumn::State,
        SortColumn::Created,
        SortColumn::Fetched,
    ];

    /// Column header text.
    pub fn header(self) -> &'static str {
        match self {
            SortColumn::PatientId => "Patient ID",
            SortColumn::ResourceType => "Resource Type",
            SortColumn::State => "Status",
            SortColumn::Created => "Created",
            SortColumn::Fetched => "Fetched",
        }
    }

    fn compare(self, a: &ResourceWrapper, b: &ResourceWrapper) -> Ordering {
        let (ma, mb) = (a.metadata(), b.metadata());
        match self {
            SortColumn::PatientId => ma.identifier.patient_id.cmp(&mb.identifier.patient_id),
            SortColumn::ResourceType => ma.resource_type.cmp(&mb.resource_type),
            SortColumn::State => ma.state.wire_name().cmp(mb.state.wire_name()),
            SortColumn::Created => ma.created_time.cmp(&mb.created_time),
            SortColumn::Fetched => ma.fetch_time.cmp(&mb.fetch_time),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for SortColumn {
    type Err = DashError;

    fn from_str(s: &str) -> DashResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "patient" | "patient-id" | "patient_id" | "patientid" => Ok(SortColumn::PatientId),
            "type" | "resource-type" | "resource_type" | "resourcetype" => {
                Ok(SortColumn::ResourceType)
            }
            "state" | "status" => Ok(SortColumn::State),
            "created" => Ok(SortColumn::Created),
            "fetched" => Ok(SortColumn::Fetched),
            other => Err(DashError::InvalidInput(format!(
                "unknown sort column '{other}' (expected patient, type, status, created or fetched)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort: which column, which way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }

    /// The sort that results from clicking `column`'s header while `current` is active.
    pub fn toggle(current: Option<SortSpec>, column: SortColumn) -> SortSpec {
        match current {
            Some(spec) if spec.column == column && spec.direction == SortDirection::Ascending => {
                SortSpec::descending(column)
            }
            _ => SortSpec::ascending(column),
        }
    }

    /// Direction marker shown next to a header.
    pub fn indicator(self) -> &'static str {
        match self.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Stable-sort `indices` (positions into `records`) by `spec`.
pub fn sort_indices(records: &[ResourceWrapper], indices: &mut [usize], spec: SortSpec) {
    indices.sort_by(|&a, &b| {
        let ordering = spec.column.compare(&records[a], &records[b]);
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
