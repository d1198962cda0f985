use log::trace;

use crate::matcher::FuzzyMatcher;
use crate::model::{ClassifyOutput, HistoricalRecord, MatchResult};
use crate::reference::{is_blank_label, ReferenceIndex};

/// Partition `records` against `index`.
///
/// Blank / `nan` labels are dropped (counted, not returned). A score equal to
/// `threshold` is a match. Input order is preserved within each partition.
pub fn classify(
    records: Vec<HistoricalRecord>,
    index: &ReferenceIndex,
    threshold: f64,
) -> ClassifyOutput {
    classify_with(records, &FuzzyMatcher::new(index), threshold)
}

/// [`classify`] with a prepared matcher, so one reference index serves
/// every sheet of a run.
pub fn classify_with(
    records: Vec<HistoricalRecord>,
    matcher: &FuzzyMatcher,
    threshold: f64,
) -> ClassifyOutput {
    let mut out = ClassifyOutput::default();

    for record in records {
        if is_blank_label(&record.label) {
            out.dropped += 1;
            continue;
        }

        let best = matcher.best_match(&record.label);
        match best.label {
            Some(label) if best.score >= threshold => {
                trace!("'{}' -> '{}' ({:.1})", record.label, label, best.score);
                out.matches.push(MatchResult {
                    matched_label: label.to_string(),
                    score: best.score,
                    record: record.with_annotation(label),
                });
            }
            _ => out.unmatched.push(record),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(row: usize, label: &str) -> HistoricalRecord {
        HistoricalRecord {
            source: "1970.xlsx".into(),
            sheet: "Tabelle1".into(),
            row,
            label: label.trim().to_string(),
            fields: vec![("Berufs".into(), label.into())],
            annotation: None,
        }
    }

    fn index() -> ReferenceIndex {
        ReferenceIndex::from_labels(["Tischler", "Elektriker"])
    }

    #[test]
    fn tischlerin_matches_tischler_at_85() {
        let out = classify(vec![rec(0, "Tischlerin")], &index(), 85.0);
        assert_eq!(out.matches.len(), 1);
        let m = &out.matches[0];
        assert_eq!(m.matched_label, "Tischler");
        assert!((m.score - 88.88888888888889).abs() < 1e-9);
        assert_eq!(m.record.annotation.as_deref(), Some("Tischler"));
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn tischlerin_unmatched_at_90() {
        let out = classify(vec![rec(0, "Tischlerin")], &index(), 90.0);
        assert!(out.matches.is_empty());
        assert_eq!(out.unmatched.len(), 1);
        assert_eq!(out.unmatched[0].annotation, None);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 17 shared chars over 20 + 20 → exactly 85.0
        let reference = ReferenceIndex::from_labels(["abcdefghijklmnopqrst"]);
        let out = classify(vec![rec(0, "abcdefghijklmnopqxyz")], &reference, 85.0);
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].score, 85.0);
    }

    #[test]
    fn blank_and_nan_labels_are_dropped() {
        let records = vec![rec(0, ""), rec(1, "  "), rec(2, "NaN"), rec(3, "Tischler")];
        let out = classify(records, &index(), 85.0);
        assert_eq!(out.dropped, 3);
        assert_eq!(out.matches.len(), 1);
        assert!(out.unmatched.is_empty());
        assert_eq!(out.total(), 4);
    }

    #[test]
    fn empty_index_leaves_everything_unmatched() {
        let records: Vec<_> = (0..10).map(|i| rec(i, &format!("Beruf {i}"))).collect();
        let out = classify(records, &ReferenceIndex::default(), 85.0);
        assert!(out.matches.is_empty());
        assert_eq!(out.unmatched.len(), 10);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn partition_is_stable() {
        let records = vec![
            rec(0, "Zimmermann"),
            rec(1, "Tischler"),
            rec(2, "Schmied"),
            rec(3, "Elektriker"),
        ];
        let out = classify(records, &index(), 85.0);
        let matched: Vec<usize> = out.matches.iter().map(|m| m.record.row).collect();
        let unmatched: Vec<usize> = out.unmatched.iter().map(|r| r.row).collect();
        assert_eq!(matched, vec![1, 3]);
        assert_eq!(unmatched, vec![0, 2]);
    }
}
