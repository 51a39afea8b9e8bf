use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    AgeVerification,
    ConsentVerification,
    ContentScreening,
    DisclaimerInclusion,
    BusinessHours,
    RecipientRateLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    pub passed: bool,
    /// False when the check did not apply (e.g. tenant requires no
    /// disclaimers). Non-applicable checks never fail the verdict.
    pub applicable: bool,
    pub detail: Option<String>,
}

impl CheckOutcome {
    pub fn passed(check: CheckKind) -> Self {
        Self {
            check,
            passed: true,
            applicable: true,
            detail: None,
        }
    }

    pub fn failed(check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            check,
            passed: false,
            applicable: true,
            detail: Some(detail.into()),
        }
    }

    pub fn not_applicable(check: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            check,
            passed: true,
            applicable: false,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregated outcome of all compliance checks for one send attempt.
/// Ephemeral: folded into the message's compliance sub-record at persist
/// time, never stored on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub passed: bool,
    pub age_verified: bool,
    pub consent_verified: bool,
    pub content_screened: bool,
    pub disclaimers_included: bool,
    pub checks: Vec<CheckOutcome>,
    pub reasons: Vec<String>,
}

impl ComplianceVerdict {
    pub fn passing() -> Self {
        Self {
            passed: true,
            age_verified: true,
            consent_verified: true,
            content_screened: true,
            disclaimers_included: true,
            checks: vec![],
            reasons: vec![],
        }
    }

    /// Terminal failure used when evaluation itself errors. Every flag is
    /// false and the error text is the only reason.
    pub fn evaluation_failure(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            age_verified: false,
            consent_verified: false,
            content_screened: false,
            disclaimers_included: false,
            checks: vec![],
            reasons: vec![detail.into()],
        }
    }
}
