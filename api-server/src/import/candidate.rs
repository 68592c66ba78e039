//! Candidate records decoded from an uploaded import file.
//!
//! Every field is optional at this stage so that a record with a missing value
//! still reaches validation and is rejected with a readable reason, instead of
//! failing the whole upload at decode time.

use crate::import::error::ImportResult;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    Commercial,
    Public,
    Government,
    Trust,
    PrivateLimitedCompany,
}

impl OrganizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Commercial => "COMMERCIAL",
            OrganizationType::Public => "PUBLIC",
            OrganizationType::Government => "GOVERNMENT",
            OrganizationType::Trust => "TRUST",
            OrganizationType::PrivateLimitedCompany => "PRIVATE_LIMITED_COMPANY",
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// One organization from an import file, not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub annual_turnover: Option<f64>,
    #[serde(default)]
    pub employees_count: Option<i64>,
    #[serde(default)]
    pub organization_type: Option<OrganizationType>,
    #[serde(default)]
    pub address: Option<CandidateAddress>,
}

impl CandidateRecord {
    /// Name with surrounding whitespace removed, or `None` when blank.
    pub fn trimmed_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref()).map(str::trim)
    }

    /// Trimmed zip code, or `None` when the address or the code is blank.
    pub fn zip_code(&self) -> Option<&str> {
        non_blank(self.address.as_ref().and_then(|a| a.zip_code.as_deref())).map(str::trim)
    }

    /// Label used for this record in error messages. `position` is zero-based.
    pub fn display_name(&self, position: usize) -> String {
        match self.trimmed_name() {
            Some(name) => name.to_string(),
            None => format!("<unnamed #{}>", position + 1),
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode an uploaded file into candidate records.
///
/// The payload must be a JSON array of organization objects. An empty array
/// decodes successfully; rejecting it is the pipeline's job.
pub fn parse_payload(bytes: &[u8]) -> ImportResult<Vec<CandidateRecord>> {
    let records: Vec<CandidateRecord> = serde_json::from_slice(bytes)?;
    Ok(records)
}
