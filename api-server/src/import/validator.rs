//! Per-record validation.
//!
//! A record is checked structurally first and then for uniqueness, both
//! against storage and against the records already accepted earlier in the
//! same batch. Storage cannot see those siblings, so the batch-local check is
//! what keeps two identical names in one upload from both being accepted.

use crate::import::candidate::CandidateRecord;
use crate::import::uniqueness::UniquenessChecker;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("name must not be blank")]
    BlankName,
    #[error("rating is required")]
    MissingRating,
    #[error("rating must be a number greater than 0")]
    InvalidRating,
    #[error("annual turnover must be greater than 0")]
    InvalidAnnualTurnover,
    #[error("employees count must be greater than 0")]
    InvalidEmployeesCount,
    #[error("address is required")]
    MissingAddress,
    #[error("zip code must not be blank")]
    BlankZipCode,
    #[error("name '{0}' already exists")]
    DuplicateName(String),
    #[error("name '{0}' is repeated in this batch")]
    DuplicateNameInBatch(String),
    #[error("zip code '{0}' already exists")]
    DuplicateZipCode(String),
    #[error("zip code '{0}' is repeated in this batch")]
    DuplicateZipCodeInBatch(String),
    #[error("rating {0} already exists")]
    DuplicateRating(f64),
    #[error("rating {0} is repeated in this batch")]
    DuplicateRatingInBatch(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationVerdict {
    Accepted,
    Rejected(Vec<Violation>),
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationVerdict::Accepted)
    }

    fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            ValidationVerdict::Accepted
        } else {
            ValidationVerdict::Rejected(violations)
        }
    }
}

/// Unique keys claimed by records accepted so far in the current batch.
#[derive(Debug, Default)]
pub struct BatchKeys {
    names: HashSet<String>,
    zip_codes: HashSet<String>,
    ratings: HashSet<u64>,
}

impl BatchKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the keys of an accepted record.
    pub fn admit(&mut self, candidate: &CandidateRecord) {
        if let Some(name) = candidate.trimmed_name() {
            self.names.insert(name.to_string());
        }
        if let Some(zip_code) = candidate.zip_code() {
            self.zip_codes.insert(zip_code.to_string());
        }
        if let Some(rating) = candidate.rating {
            self.ratings.insert(rating.to_bits());
        }
    }

    fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn has_zip_code(&self, zip_code: &str) -> bool {
        self.zip_codes.contains(zip_code)
    }

    fn has_rating(&self, rating: f64) -> bool {
        self.ratings.contains(&rating.to_bits())
    }
}

#[derive(Clone)]
pub struct RecordValidator {
    checker: UniquenessChecker,
    unique_rating: bool,
}

impl RecordValidator {
    pub fn new(checker: UniquenessChecker, unique_rating: bool) -> Self {
        Self {
            checker,
            unique_rating,
        }
    }

    /// Validate one candidate. Does not claim its keys; call
    /// [`BatchKeys::admit`] once the record is accepted.
    pub async fn validate(&self, candidate: &CandidateRecord, batch: &BatchKeys) -> ValidationVerdict {
        let mut violations = structural_violations(candidate);

        if let Some(name) = candidate.trimmed_name() {
            if batch.has_name(name) {
                violations.push(Violation::DuplicateNameInBatch(name.to_string()));
            } else if self.checker.check_name(name).await.is_conflict() {
                violations.push(Violation::DuplicateName(name.to_string()));
            }
        }

        if let Some(zip_code) = candidate.zip_code() {
            if batch.has_zip_code(zip_code) {
                violations.push(Violation::DuplicateZipCodeInBatch(zip_code.to_string()));
            } else if self.checker.check_zip_code(zip_code).await.is_conflict() {
                violations.push(Violation::DuplicateZipCode(zip_code.to_string()));
            }
        }

        if self.unique_rating {
            if let Some(rating) = candidate.rating.filter(|r| r.is_finite()) {
                if batch.has_rating(rating) {
                    violations.push(Violation::DuplicateRatingInBatch(rating));
                } else if self.checker.check_rating(rating).await.is_conflict() {
                    violations.push(Violation::DuplicateRating(rating));
                }
            }
        }

        ValidationVerdict::from_violations(violations)
    }
}

/// Checks that need no storage access, in field order.
pub fn structural_violations(candidate: &CandidateRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    if candidate.trimmed_name().is_none() {
        violations.push(Violation::BlankName);
    }

    match candidate.rating {
        None => violations.push(Violation::MissingRating),
        Some(rating) if !rating.is_finite() || rating <= 0.0 => {
            violations.push(Violation::InvalidRating)
        }
        Some(_) => {}
    }

    if candidate.annual_turnover.is_some_and(|t| !t.is_finite() || t <= 0.0) {
        violations.push(Violation::InvalidAnnualTurnover);
    }

    if candidate.employees_count.is_some_and(|c| c <= 0) {
        violations.push(Violation::InvalidEmployeesCount);
    }

    match &candidate.address {
        None => violations.push(Violation::MissingAddress),
        Some(_) if candidate.zip_code().is_none() => violations.push(Violation::BlankZipCode),
        Some(_) => {}
    }

    violations
}
