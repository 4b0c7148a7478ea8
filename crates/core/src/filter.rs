//! Free-text search over resource records.
//!
//! A record matches when any searchable field, lower-cased, contains the lower-cased trimmed
//! query as a plain substring. Searchable fields are the patient id, resource type, processing
//! state (wire name and display label), description and AI summary. A missing summary is treated
//! as empty text.
//!
//! Filtering never reorders: survivors keep their input order.

use ehr_resource::ResourceWrapper;

/// Normalise a raw query. Returns `None` when the query is blank (no filtering).
pub fn normalise_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Returns true if `record` matches an already normalised (trimmed, lower-cased) needle.
pub fn matches(record: &ResourceWrapper, needle: &str) -> bool {
    let metadata = record.metadata();
    contains_folded(&metadata.identifier.patient_id, needle)
        || contains_folded(&metadata.resource_type, needle)
        || contains_folded(metadata.state.wire_name(), needle)
        || contains_folded(metadata.state.label(), needle)
        || contains_folded(record.description(), needle)
        || contains_folded(record.ai_summary().unwrap_or(""), needle)
}

/// Positions of the records matching `query`, in input order.
///
/// A blank query selects every record.
pub fn filter_indices(records: &[ResourceWrapper], query: &str) -> Vec<usize> {
    match normalise_query(query) {
        None => (0..records.len()).collect(),
        Some(needle) => records
            .iter()
            .enumerate()
            .filter(|(_, record)| matches(record, &needle))
            .map(|(index, _)| index)
            .collect(),
    }
}

/// The records matching `query`, in input order.
pub fn filter<'a>(records: &'a [ResourceWrapper], query: &str) -> Vec<&'a ResourceWrapper> {
    filter_indices(records, query)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ehr_resource::sample_resources;

    #[test]
    fn blank_query_is_identity() {
        let records = sample_resources();
        for query in ["", "   ", "\t\n"] {
            let result = filter(&records, query);
            assert_eq!(result.len(), records.len());
            for (kept, original) in result.iter().zip(&records) {
                assert_eq!(*kept, original);
            }
        }
    }

    #[test]
    fn blood_matches_two_samples() {
        let records = sample_resources();
        let result = filter(&records, "blood");
        let keys: Vec<&str> = result
            .iter()
            .map(|r| r.metadata().identifier.key.as_str())
            .collect();
        assert_eq!(keys, ["patient-001-observation-001", "patient-001-lab-001"]);
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        let records = sample_resources();
        assert_eq!(filter(&records, "  BLOOD ").len(), 2);
        assert_eq!(filter(&records, "Lisinopril").len(), 1);
    }

    #[test]
    fn matches_patient_type_and_state() {
        let records = sample_resources();
        assert_eq!(filter(&records, "patient-001").len(), 2);
        assert_eq!(filter(&records, "allergyintolerance").len(), 1);
        assert_eq!(filter(&records, "not started").len(), 1);
        assert_eq!(filter(&records, "processing_state_failed").len(), 1);
    }

    #[test]
    fn missing_summary_never_matches() {
        let records = sample_resources();
        // Only the first sample's summary mentions "healthy".
        let result = filter(&records, "healthy");
        assert_eq!(result.len(), 1);
        assert!(result[0].ai_summary().is_some());
    }

    #[test]
    fn results_are_an_ordered_subset_satisfying_the_predicate() {
        let records = sample_resources();
        for query in ["a", "patient", "e", "zzz", "completed", "R4"] {
            let indices = filter_indices(&records, query);
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
            let needle = normalise_query(query).unwrap();
            for index in indices {
                assert!(matches(&records[index], &needle));
            }
        }
    }

    #[test]
    fn filtering_is_repeatable() {
        let records = sample_resources();
        assert_eq!(
            filter_indices(&records, "diabetes"),
            filter_indices(&records, "diabetes")
        );
    }
}
