use std::sync::Arc;

use chrono::{DateTime, Local, Timelike};

use crate::application::services::content::ResolvedContent;
use crate::domain::{
    models::{CheckKind, CheckOutcome, ComplianceVerdict, Recipient, TenantConfig, MAX_TEXT_CHARS},
    repositories::RateLimiter,
};

pub const MAX_MEDIA_BYTES: u64 = 5 * 1024 * 1024;
pub const BUSINESS_HOURS: (u32, u32) = (9, 21);

/// Built-in fallbacks, injected at construction. Tenant-supplied lists always
/// take precedence; there is no process-wide mutable state behind these.
#[derive(Debug, Clone)]
pub struct ComplianceDefaults {
    pub restricted_keywords: Vec<String>,
    pub required_disclaimers: Vec<String>,
    pub blocked_patterns: Vec<String>,
    pub allowed_media_types: Vec<String>,
}

impl Default for ComplianceDefaults {
    fn default() -> Self {
        Self {
            restricted_keywords: vec![
                "free giveaway".to_string(),
                "no id required".to_string(),
                "minors welcome".to_string(),
                "under 21".to_string(),
                "no age check".to_string(),
            ],
            required_disclaimers: vec![
                "21+".to_string(),
                "must be 21".to_string(),
                "adults only".to_string(),
            ],
            blocked_patterns: vec![
                "act now before".to_string(),
                "guaranteed high".to_string(),
                "undetectable".to_string(),
            ],
            allowed_media_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "video/mp4".to_string(),
                "application/pdf".to_string(),
            ],
        }
    }
}

/// Runs the six independent checks and aggregates one verdict. Every check is
/// evaluated, never short-circuited, so a single pass reports every
/// applicable failure reason.
pub struct ComplianceEvaluator {
    defaults: ComplianceDefaults,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl ComplianceEvaluator {
    pub fn new(defaults: ComplianceDefaults, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            defaults,
            rate_limiter,
        }
    }

    /// Never surfaces an internal fault to the caller: an evaluation error
    /// becomes a terminal all-false verdict carrying the error text.
    pub async fn evaluate(
        &self,
        tenant: &TenantConfig,
        recipient: &Recipient,
        content: &ResolvedContent,
        at: DateTime<Local>,
    ) -> ComplianceVerdict {
        match self.try_evaluate(tenant, recipient, content, at).await {
            Ok(verdict) => verdict,
            Err(err) => {
                tracing::error!(tenant_id = %tenant.id, error = %err, "compliance evaluation failed");
                ComplianceVerdict::evaluation_failure(format!("compliance evaluation error: {err}"))
            }
        }
    }

    async fn try_evaluate(
        &self,
        tenant: &TenantConfig,
        recipient: &Recipient,
        content: &ResolvedContent,
        at: DateTime<Local>,
    ) -> anyhow::Result<ComplianceVerdict> {
        let age = self.check_age(tenant, recipient);
        let consent = self.check_consent(tenant, recipient);
        let screening = self.check_content(tenant, content);
        let disclaimers = self.check_disclaimers(tenant, content);
        let hours = self.check_business_hours(at);
        let rate = self.check_rate(tenant, recipient).await?;

        let checks = vec![age, consent, screening, disclaimers, hours, rate];
        let passed = checks
            .iter()
            .all(|outcome| outcome.passed || !outcome.applicable);

        let mut reasons: Vec<String> = Vec::new();
        for outcome in checks.iter().filter(|o| o.applicable && !o.passed) {
            if let Some(detail) = &outcome.detail {
                if !reasons.contains(detail) {
                    reasons.push(detail.clone());
                }
            }
        }

        let outcome_of = |kind: CheckKind| {
            checks
                .iter()
                .find(|o| o.check == kind)
                .map(|o| o.passed)
                .unwrap_or(false)
        };

        Ok(ComplianceVerdict {
            passed,
            age_verified: outcome_of(CheckKind::AgeVerification),
            consent_verified: outcome_of(CheckKind::ConsentVerification),
            content_screened: outcome_of(CheckKind::ContentScreening),
            disclaimers_included: outcome_of(CheckKind::DisclaimerInclusion),
            checks,
            reasons,
        })
    }

    fn check_age(&self, tenant: &TenantConfig, recipient: &Recipient) -> CheckOutcome {
        if !tenant.compliance.require_age_verification || recipient.age_verified {
            CheckOutcome::passed(CheckKind::AgeVerification)
        } else {
            CheckOutcome::failed(CheckKind::AgeVerification, "Age verification required")
        }
    }

    fn check_consent(&self, tenant: &TenantConfig, recipient: &Recipient) -> CheckOutcome {
        if !tenant.compliance.require_consent || recipient.consent_given {
            CheckOutcome::passed(CheckKind::ConsentVerification)
        } else {
            CheckOutcome::failed(CheckKind::ConsentVerification, "Consent verification required")
        }
    }

    /// The scan always runs to completion; a rejection records the first
    /// encountered reason in the order keyword, pattern, media, length.
    fn check_content(&self, tenant: &TenantConfig, content: &ResolvedContent) -> CheckOutcome {
        let text = content.text.to_lowercase();

        let keywords = if tenant.compliance.restricted_keywords.is_empty() {
            &self.defaults.restricted_keywords
        } else {
            &tenant.compliance.restricted_keywords
        };
        if let Some(hit) = keywords
            .iter()
            .find(|keyword| text.contains(&keyword.to_lowercase()))
        {
            return CheckOutcome::failed(
                CheckKind::ContentScreening,
                format!("Restricted keyword detected: {hit}"),
            );
        }

        if let Some(hit) = self
            .defaults
            .blocked_patterns
            .iter()
            .find(|pattern| text.contains(&pattern.to_lowercase()))
        {
            return CheckOutcome::failed(
                CheckKind::ContentScreening,
                format!("Inappropriate content pattern detected: {hit}"),
            );
        }

        let allowed_types = if tenant.compliance.allowed_media_types.is_empty() {
            &self.defaults.allowed_media_types
        } else {
            &tenant.compliance.allowed_media_types
        };
        for item in &content.media {
            if !allowed_types.contains(&item.mime_type) {
                return CheckOutcome::failed(
                    CheckKind::ContentScreening,
                    format!("Media type not allowed: {}", item.mime_type),
                );
            }
            if item.byte_size > MAX_MEDIA_BYTES {
                return CheckOutcome::failed(
                    CheckKind::ContentScreening,
                    format!("Media item exceeds size limit: {}", item.filename),
                );
            }
        }

        if content.text.chars().count() > MAX_TEXT_CHARS {
            return CheckOutcome::failed(
                CheckKind::ContentScreening,
                format!("Message text exceeds {MAX_TEXT_CHARS} characters"),
            );
        }

        CheckOutcome::passed(CheckKind::ContentScreening)
    }

    /// An empty tenant disclaimer list means the check is not applicable and
    /// never fails the verdict; the default set is still scanned so the
    /// disclaimers-included flag stays informative.
    fn check_disclaimers(&self, tenant: &TenantConfig, content: &ResolvedContent) -> CheckOutcome {
        let text = content.text.to_lowercase();
        let contains_any = |list: &[String]| {
            list.iter()
                .any(|disclaimer| text.contains(&disclaimer.to_lowercase()))
        };

        if tenant.compliance.required_disclaimers.is_empty() {
            return if contains_any(&self.defaults.required_disclaimers) {
                CheckOutcome::passed(CheckKind::DisclaimerInclusion)
            } else {
                CheckOutcome::not_applicable(
                    CheckKind::DisclaimerInclusion,
                    "tenant requires no disclaimers",
                )
            };
        }

        if contains_any(&tenant.compliance.required_disclaimers) {
            CheckOutcome::passed(CheckKind::DisclaimerInclusion)
        } else {
            CheckOutcome::failed(
                CheckKind::DisclaimerInclusion,
                format!(
                    "Required disclaimer missing: expected one of [{}]",
                    tenant.compliance.required_disclaimers.join(", ")
                ),
            )
        }
    }

    /// Fixed tenant-independent window, local clock-hour in [9, 21).
    fn check_business_hours(&self, at: DateTime<Local>) -> CheckOutcome {
        let hour = at.hour();
        if hour >= BUSINESS_HOURS.0 && hour < BUSINESS_HOURS.1 {
            CheckOutcome::passed(CheckKind::BusinessHours)
        } else {
            CheckOutcome::failed(
                CheckKind::BusinessHours,
                format!(
                    "Outside business hours ({}:00-{}:00)",
                    BUSINESS_HOURS.0, BUSINESS_HOURS.1
                ),
            )
        }
    }

    async fn check_rate(
        &self,
        tenant: &TenantConfig,
        recipient: &Recipient,
    ) -> anyhow::Result<CheckOutcome> {
        let decision = self
            .rate_limiter
            .check(
                tenant.id,
                &recipient.address,
                tenant.compliance.max_messages_per_recipient_per_day,
            )
            .await?;
        Ok(if decision.allowed {
            CheckOutcome::passed(CheckKind::RecipientRateLimit)
        } else {
            CheckOutcome::failed(
                CheckKind::RecipientRateLimit,
                "Recipient daily message limit reached",
            )
        })
    }
}
