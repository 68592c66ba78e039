//! Splits a validated batch into the records to write and the rejections to report.

use crate::import::candidate::CandidateRecord;
use crate::import::outcome::{ImportStatus, Rejection};
use crate::import::validator::ValidationVerdict;

/// Accepted records in input order, plus rejections in input order.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub total: usize,
    pub accepted: Vec<CandidateRecord>,
    pub rejections: Vec<Rejection>,
}

impl ImportPlan {
    /// Status the batch would have if every accepted record is written.
    pub fn status(&self) -> ImportStatus {
        if self.rejections.is_empty() {
            ImportStatus::Success
        } else if self.accepted.is_empty() {
            ImportStatus::Failed
        } else {
            ImportStatus::Partial
        }
    }
}

/// Pair each candidate with its verdict.
///
/// `verdicts` must be in the same order as `candidates`. An empty batch never
/// reaches the planner; the pipeline rejects it up front.
pub fn plan(candidates: Vec<CandidateRecord>, verdicts: Vec<ValidationVerdict>) -> ImportPlan {
    debug_assert_eq!(candidates.len(), verdicts.len());

    let total = candidates.len();
    let mut accepted = Vec::with_capacity(total);
    let mut rejections = Vec::new();

    for (position, (candidate, verdict)) in candidates.into_iter().zip(verdicts).enumerate() {
        match verdict {
            ValidationVerdict::Accepted => accepted.push(candidate),
            ValidationVerdict::Rejected(violations) => rejections.push(Rejection::new(
                candidate.display_name(position),
                violations.iter().map(ToString::to_string).collect(),
            )),
        }
    }

    ImportPlan {
        total,
        accepted,
        rejections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::validator::Violation;

    fn named(name: &str) -> CandidateRecord {
        CandidateRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn all_accepted_plans_success() {
        let plan = plan(
            vec![named("A"), named("B")],
            vec![ValidationVerdict::Accepted, ValidationVerdict::Accepted],
        );
        assert_eq!(plan.status(), ImportStatus::Success);
        assert_eq!(plan.accepted.len(), 2);
        assert!(plan.rejections.is_empty());
    }

    #[test]
    fn mixed_verdicts_keep_order() {
        let plan = plan(
            vec![named("A"), named("B"), named("C")],
            vec![
                ValidationVerdict::Accepted,
                ValidationVerdict::Rejected(vec![Violation::MissingRating]),
                ValidationVerdict::Accepted,
            ],
        );
        assert_eq!(plan.status(), ImportStatus::Partial);
        let names: Vec<_> = plan.accepted.iter().filter_map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(plan.rejections[0].to_string(), "B: rating is required");
    }

    #[test]
    fn all_rejected_plans_failure() {
        let plan = plan(
            vec![CandidateRecord::default()],
            vec![ValidationVerdict::Rejected(vec![Violation::BlankName])],
        );
        assert_eq!(plan.status(), ImportStatus::Failed);
        assert_eq!(plan.rejections[0].name, "<unnamed #1>");
    }
}
