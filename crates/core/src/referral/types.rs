//! Types for referral conflict analysis.

use serde::Serialize;

/// Where a candidate referrer was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceSource {
    /// Legacy `referrer_id` column on the client row.
    LegacyReferrerColumn,
    /// Affiliate claims matched through the client's services.
    AffiliateClaims,
    /// Auxiliary referrer-entries table keyed by referred client id.
    ReferrerEntries,
    /// Auxiliary commission-history table keyed by client id.
    AffiliateHistory,
}

impl EvidenceSource {
    /// Human-readable source label used in API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyReferrerColumn => "referrer_id column",
            Self::AffiliateClaims => "affiliate claims table",
            Self::ReferrerEntries => "referrer entries table",
            Self::AffiliateHistory => "affiliate history table",
        }
    }
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EvidenceSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What kind of referral evidence a candidate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandidateKind {
    /// Resolved from the legacy referrer column.
    #[serde(rename = "Database Referrer")]
    DatabaseReferrer,
    /// Resolved from an affiliate claim or auxiliary affiliate table.
    #[serde(rename = "Affiliate Claim")]
    AffiliateClaim,
}

impl CandidateKind {
    /// Priority order when sources disagree; lower wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::DatabaseReferrer => 1,
            Self::AffiliateClaim => 2,
        }
    }
}

/// A candidate referrer as gathered from one source, before noise filtering.
///
/// Name or email may be unresolvable when the underlying linkage is broken;
/// such candidates are discarded by the analyzer, not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrerCandidate {
    /// Evidence kind.
    pub kind: CandidateKind,
    /// Resolved referrer name, if any.
    pub name: Option<String>,
    /// Resolved referrer email, if any.
    pub email: Option<String>,
    /// Source the candidate came from.
    pub source: EvidenceSource,
    /// Free-text details (claim id, service id, last-paid date).
    pub details: String,
}

/// A candidate that survived noise filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReferrer {
    /// Evidence kind.
    #[serde(rename = "type")]
    pub kind: CandidateKind,
    /// Referrer name.
    pub name: String,
    /// Referrer email.
    pub email: String,
    /// Source the candidate came from.
    pub source: EvidenceSource,
    /// Free-text details.
    pub details: String,
    /// Priority derived from the evidence kind.
    pub priority: u8,
}

/// Result of consulting one evidence source.
///
/// A source that cannot be consulted (missing table, missing column, query
/// failure) reports `Unavailable` and contributes zero candidates; it never
/// aborts the overall analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source was queried; zero or more candidates came back.
    Available(Vec<ReferrerCandidate>),
    /// The source could not be consulted.
    Unavailable {
        /// Why the source was skipped.
        reason: String,
    },
}

/// One evidence source together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    /// The source consulted.
    pub source: EvidenceSource,
    /// What came back.
    pub outcome: SourceOutcome,
}

impl SourceReport {
    /// A source that produced candidates.
    #[must_use]
    pub const fn available(source: EvidenceSource, candidates: Vec<ReferrerCandidate>) -> Self {
        Self {
            source,
            outcome: SourceOutcome::Available(candidates),
        }
    }

    /// A source that could not be consulted.
    #[must_use]
    pub fn unavailable(source: EvidenceSource, reason: impl Into<String>) -> Self {
        Self {
            source,
            outcome: SourceOutcome::Unavailable {
                reason: reason.into(),
            },
        }
    }
}

/// A source that was skipped, as surfaced in the API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableSource {
    /// The source that was skipped.
    pub source: EvidenceSource,
    /// Why it was skipped.
    pub reason: String,
}

/// Unscored free-text evidence surfaced alongside the conflict decision.
///
/// These never count toward the conflict score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AdditionalSource {
    /// A client custom field whose name mentions referrals.
    #[serde(rename = "Custom Field")]
    CustomField {
        /// The custom field's name.
        field_name: String,
        /// The stored value for this client.
        value: String,
        /// Human-readable source label.
        source: String,
    },
    /// Support-ticket replies mentioning referrals.
    #[serde(rename = "Support Notes")]
    TicketMentions {
        /// How many replies matched.
        count: u64,
        /// Human-readable source label.
        source: String,
    },
}

impl AdditionalSource {
    /// Evidence from a client custom field.
    #[must_use]
    pub fn custom_field(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        let field_name = field_name.into();
        let source = format!("Custom field: {field_name}");
        Self::CustomField {
            field_name,
            value: value.into(),
            source,
        }
    }

    /// Evidence from support-ticket replies.
    #[must_use]
    pub fn ticket_mentions(count: u64) -> Self {
        Self::TicketMentions {
            count,
            source: "Support tickets mentioning referrals".to_string(),
        }
    }
}

/// Conflict severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSeverity {
    /// No conflict.
    None,
    /// Conflict between a small number of affiliates.
    Medium,
    /// Conflict between more affiliates than the configured threshold.
    High,
}

impl ConflictSeverity {
    /// String form used in API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Serialize for ConflictSeverity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Tunable constants for the conflict decision.
#[derive(Debug, Clone, Copy)]
pub struct ConflictPolicy {
    /// Distinct-affiliate count above which a conflict is High severity.
    pub high_threshold: usize,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self { high_threshold: 2 }
    }
}

/// Counts summarizing the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    /// Retained candidates.
    pub total_claims: usize,
    /// Distinct affiliate emails among retained candidates.
    pub unique_affiliates: usize,
    /// Retained candidates from the legacy referrer column.
    pub database_referrers: usize,
    /// Retained candidates from affiliate claims and auxiliary tables.
    pub affiliate_claims: usize,
    /// Unscored free-text sources surfaced alongside the decision.
    pub additional_sources: usize,
}

/// The full conflict analysis, serialized as `referral_analysis` in the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictReport {
    /// Whether more than one distinct affiliate claims this client.
    pub conflict_detected: bool,
    /// Severity of the conflict.
    pub conflict_severity: ConflictSeverity,
    /// Human-readable summary of the decision.
    pub conflict_message: String,
    /// Every retained candidate, in priority order.
    pub all_referrers: Vec<ResolvedReferrer>,
    /// Unscored free-text evidence.
    pub additional_sources: Vec<AdditionalSource>,
    /// Sources that could not be consulted.
    pub unavailable_sources: Vec<UnavailableSource>,
    /// Counts summarizing the analysis.
    pub analysis_summary: AnalysisSummary,
}
