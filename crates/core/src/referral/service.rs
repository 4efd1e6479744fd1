//! Conflict decision logic and lookup input validation.

use super::error::ReferralError;
use super::types::{
    AdditionalSource, AnalysisSummary, CandidateKind, ConflictPolicy, ConflictReport,
    ConflictSeverity, ResolvedReferrer, SourceOutcome, SourceReport, UnavailableSource,
};

/// Minimum accepted search term length.
pub const MIN_SEARCH_TERM_LEN: usize = 2;

/// Validates a client search term before any query executes.
///
/// # Errors
///
/// Returns `ReferralError::TermTooShort` when the trimmed term is shorter
/// than [`MIN_SEARCH_TERM_LEN`].
pub fn validate_search_term(term: &str) -> Result<&str, ReferralError> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_TERM_LEN {
        return Err(ReferralError::TermTooShort {
            min: MIN_SEARCH_TERM_LEN,
        });
    }
    Ok(term)
}

/// Validates the client email handed to conflict analysis.
///
/// # Errors
///
/// Returns `ReferralError::EmailRequired` when the trimmed email is empty.
pub fn validate_client_email(email: &str) -> Result<&str, ReferralError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ReferralError::EmailRequired);
    }
    Ok(email)
}

/// Remediation suggestions returned with a `not_found` conflict lookup.
#[must_use]
pub fn not_found_suggestions() -> Vec<&'static str> {
    vec![
        "Check if the email is correct",
        "Client might be in a different database",
        "Client might have been added after database export",
    ]
}

/// Applies the conflict decision to gathered evidence.
///
/// Candidates whose name or email did not resolve are treated as noise and
/// excluded from every count. The decision itself only looks at distinct
/// email strings; free-text additional sources are carried through unscored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictAnalyzer {
    policy: ConflictPolicy,
}

impl ConflictAnalyzer {
    /// Creates an analyzer with the given policy.
    #[must_use]
    pub const fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    /// Analyzes per-source evidence into a conflict report.
    #[must_use]
    pub fn analyze(
        &self,
        sources: Vec<SourceReport>,
        additional_sources: Vec<AdditionalSource>,
    ) -> ConflictReport {
        let mut referrers: Vec<ResolvedReferrer> = Vec::new();
        let mut unavailable: Vec<UnavailableSource> = Vec::new();

        for report in sources {
            match report.outcome {
                SourceOutcome::Available(candidates) => {
                    referrers.extend(candidates.into_iter().filter_map(|candidate| {
                        let name = candidate.name.filter(|n| !n.trim().is_empty())?;
                        let email = candidate.email.filter(|e| !e.trim().is_empty())?;
                        Some(ResolvedReferrer {
                            kind: candidate.kind,
                            name,
                            email,
                            source: candidate.source,
                            details: candidate.details,
                            priority: candidate.kind.priority(),
                        })
                    }));
                }
                SourceOutcome::Unavailable { reason } => {
                    unavailable.push(UnavailableSource {
                        source: report.source,
                        reason,
                    });
                }
            }
        }

        referrers.sort_by_key(|r| r.priority);

        let total_claims = referrers.len();
        let unique_affiliates = {
            let mut emails: Vec<&str> = referrers.iter().map(|r| r.email.as_str()).collect();
            emails.sort_unstable();
            emails.dedup();
            emails.len()
        };

        let conflict_detected = unique_affiliates > 1;
        let (conflict_severity, conflict_message) = if conflict_detected {
            let severity = if unique_affiliates > self.policy.high_threshold {
                ConflictSeverity::High
            } else {
                ConflictSeverity::Medium
            };
            (
                severity,
                format!(
                    "Multiple referral claims detected! Found {total_claims} claims from \
                     {unique_affiliates} unique affiliates."
                ),
            )
        } else if total_claims > 0 {
            (
                ConflictSeverity::None,
                "Single referral claim found. No conflicts detected.".to_string(),
            )
        } else {
            (
                ConflictSeverity::None,
                "No referral claims found. Client appears to be a direct registration.".to_string(),
            )
        };

        let database_referrers = referrers
            .iter()
            .filter(|r| r.kind == CandidateKind::DatabaseReferrer)
            .count();
        let affiliate_claims = total_claims - database_referrers;

        ConflictReport {
            conflict_detected,
            conflict_severity,
            conflict_message,
            analysis_summary: AnalysisSummary {
                total_claims,
                unique_affiliates,
                database_referrers,
                affiliate_claims,
                additional_sources: additional_sources.len(),
            },
            all_referrers: referrers,
            additional_sources,
            unavailable_sources: unavailable,
        }
    }
}
