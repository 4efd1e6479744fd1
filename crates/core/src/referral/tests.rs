//! Tests for referral conflict analysis.

use proptest::prelude::*;
use rstest::rstest;

use super::error::ReferralError;
use super::service::{ConflictAnalyzer, not_found_suggestions, validate_client_email, validate_search_term};
use super::types::{
    AdditionalSource, CandidateKind, ConflictPolicy, ConflictSeverity, EvidenceSource,
    ReferrerCandidate, SourceReport,
};

fn claim(email: &str) -> ReferrerCandidate {
    ReferrerCandidate {
        kind: CandidateKind::AffiliateClaim,
        name: Some(format!("Affiliate {email}")),
        email: Some(email.to_string()),
        source: EvidenceSource::AffiliateClaims,
        details: "Affiliate ID: #1".to_string(),
    }
}

fn legacy(email: &str) -> ReferrerCandidate {
    ReferrerCandidate {
        kind: CandidateKind::DatabaseReferrer,
        name: Some(format!("Referrer {email}")),
        email: Some(email.to_string()),
        source: EvidenceSource::LegacyReferrerColumn,
        details: "Client ID: #7".to_string(),
    }
}

fn analyze(candidates: Vec<ReferrerCandidate>) -> super::types::ConflictReport {
    ConflictAnalyzer::default().analyze(
        vec![SourceReport::available(
            EvidenceSource::AffiliateClaims,
            candidates,
        )],
        Vec::new(),
    )
}

#[test]
fn test_no_claims_is_direct_registration() {
    let report = analyze(Vec::new());

    assert!(!report.conflict_detected);
    assert_eq!(report.conflict_severity, ConflictSeverity::None);
    assert_eq!(report.analysis_summary.total_claims, 0);
    assert_eq!(report.analysis_summary.unique_affiliates, 0);
    assert!(report.conflict_message.contains("direct registration"));
}

#[test]
fn test_single_claim_is_not_a_conflict() {
    let report = analyze(vec![claim("b@x.com")]);

    assert!(!report.conflict_detected);
    assert_eq!(report.conflict_severity, ConflictSeverity::None);
    assert_eq!(report.analysis_summary.total_claims, 1);
    assert_eq!(report.all_referrers.len(), 1);
    assert_eq!(report.all_referrers[0].email, "b@x.com");
}

#[test]
fn test_repeated_email_dedupes_to_single_affiliate() {
    let report = analyze(vec![claim("b@x.com"), claim("b@x.com")]);

    assert!(!report.conflict_detected);
    assert_eq!(report.analysis_summary.total_claims, 2);
    assert_eq!(report.analysis_summary.unique_affiliates, 1);
    assert_eq!(report.conflict_severity, ConflictSeverity::None);
}

#[test]
fn test_claim_plus_legacy_referrer_is_medium_conflict() {
    // Client referred via a claim from b@x.com, plus a legacy referrer_id
    // pointing at c@x.com: two distinct emails.
    let analyzer = ConflictAnalyzer::default();
    let report = analyzer.analyze(
        vec![
            SourceReport::available(EvidenceSource::LegacyReferrerColumn, vec![legacy("c@x.com")]),
            SourceReport::available(EvidenceSource::AffiliateClaims, vec![claim("b@x.com")]),
        ],
        Vec::new(),
    );

    assert!(report.conflict_detected);
    assert_eq!(report.conflict_severity, ConflictSeverity::Medium);
    assert_eq!(report.analysis_summary.total_claims, 2);
    assert_eq!(report.analysis_summary.unique_affiliates, 2);
    assert_eq!(report.analysis_summary.database_referrers, 1);
    assert_eq!(report.analysis_summary.affiliate_claims, 1);
    // Priority 1 sources sort ahead of claims
    assert_eq!(report.all_referrers[0].kind, CandidateKind::DatabaseReferrer);
    assert_eq!(report.all_referrers[0].priority, 1);
}

#[rstest]
#[case(2, ConflictSeverity::Medium)]
#[case(3, ConflictSeverity::High)]
#[case(5, ConflictSeverity::High)]
fn test_severity_thresholds(#[case] distinct: usize, #[case] expected: ConflictSeverity) {
    let candidates = (0..distinct).map(|i| claim(&format!("a{i}@x.com"))).collect();
    let report = analyze(candidates);

    assert!(report.conflict_detected);
    assert_eq!(report.conflict_severity, expected);
}

#[test]
fn test_high_threshold_is_configurable() {
    let analyzer = ConflictAnalyzer::new(ConflictPolicy { high_threshold: 3 });
    let candidates = (0..3).map(|i| claim(&format!("a{i}@x.com"))).collect();
    let report = analyzer.analyze(
        vec![SourceReport::available(
            EvidenceSource::AffiliateClaims,
            candidates,
        )],
        Vec::new(),
    );

    // Three distinct affiliates no longer exceed the raised threshold.
    assert_eq!(report.conflict_severity, ConflictSeverity::Medium);
}

#[test]
fn test_malformed_candidates_are_noise() {
    let mut malformed = claim("ignored@x.com");
    malformed.email = None;
    let mut blank_name = claim("blank@x.com");
    blank_name.name = Some("  ".to_string());

    let clean = analyze(vec![claim("b@x.com")]);
    let noisy = analyze(vec![claim("b@x.com"), malformed, blank_name]);

    assert_eq!(clean.analysis_summary, noisy.analysis_summary);
    assert_eq!(clean.all_referrers, noisy.all_referrers);
    assert!(!noisy.conflict_detected);
}

#[test]
fn test_unavailable_source_is_surfaced_not_fatal() {
    let analyzer = ConflictAnalyzer::default();
    let report = analyzer.analyze(
        vec![
            SourceReport::available(EvidenceSource::AffiliateClaims, vec![claim("b@x.com")]),
            SourceReport::unavailable(EvidenceSource::ReferrerEntries, "table missing"),
        ],
        Vec::new(),
    );

    assert!(!report.conflict_detected);
    assert_eq!(report.analysis_summary.total_claims, 1);
    assert_eq!(report.unavailable_sources.len(), 1);
    assert_eq!(
        report.unavailable_sources[0].source,
        EvidenceSource::ReferrerEntries
    );
}

#[test]
fn test_additional_sources_never_count_toward_conflict() {
    let analyzer = ConflictAnalyzer::default();
    let report = analyzer.analyze(
        vec![SourceReport::available(
            EvidenceSource::AffiliateClaims,
            vec![claim("b@x.com")],
        )],
        vec![
            AdditionalSource::custom_field("Referred By", "someone else"),
            AdditionalSource::ticket_mentions(4),
        ],
    );

    assert!(!report.conflict_detected);
    assert_eq!(report.analysis_summary.additional_sources, 2);
    assert_eq!(report.additional_sources.len(), 2);
}

#[test]
fn test_report_serialization_shape() {
    let report = analyze(vec![claim("b@x.com"), claim("c@x.com")]);
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["conflict_detected"], true);
    assert_eq!(json["conflict_severity"], "Medium");
    assert_eq!(json["all_referrers"][0]["type"], "Affiliate Claim");
    assert_eq!(json["all_referrers"][0]["source"], "affiliate claims table");
    assert_eq!(json["analysis_summary"]["unique_affiliates"], 2);
}

#[rstest]
#[case("")]
#[case("a")]
#[case(" x ")]
fn test_short_search_terms_rejected(#[case] term: &str) {
    assert_eq!(
        validate_search_term(term),
        Err(ReferralError::TermTooShort { min: 2 })
    );
}

#[test]
fn test_search_term_is_trimmed() {
    assert_eq!(validate_search_term("  acme  "), Ok("acme"));
}

#[test]
fn test_client_email_required() {
    assert_eq!(validate_client_email("   "), Err(ReferralError::EmailRequired));
    assert_eq!(validate_client_email(" a@x.com "), Ok("a@x.com"));
}

#[test]
fn test_not_found_suggestions_nonempty() {
    assert!(!not_found_suggestions().is_empty());
}

proptest! {
    /// Conflict is detected exactly when at least two distinct emails
    /// survive filtering, regardless of how many claims carry each email.
    #[test]
    fn prop_conflict_iff_two_distinct_emails(
        distinct in 0usize..6,
        repeats in 1usize..4,
    ) {
        let candidates: Vec<_> = (0..distinct)
            .flat_map(|i| {
                let email = format!("a{i}@x.com");
                (0..repeats).map(move |_| claim(&email))
            })
            .collect();

        let report = analyze(candidates);

        prop_assert_eq!(report.conflict_detected, distinct > 1);
        prop_assert_eq!(report.analysis_summary.total_claims, distinct * repeats);
        prop_assert_eq!(report.analysis_summary.unique_affiliates, distinct);
    }

    /// Severity is High exactly when the distinct-email count exceeds the
    /// configured threshold; otherwise Medium for conflicts, None otherwise.
    #[test]
    fn prop_severity_matches_threshold(
        distinct in 0usize..8,
        threshold in 1usize..5,
    ) {
        let analyzer = ConflictAnalyzer::new(ConflictPolicy { high_threshold: threshold });
        let candidates = (0..distinct).map(|i| claim(&format!("a{i}@x.com"))).collect();
        let report = analyzer.analyze(
            vec![SourceReport::available(EvidenceSource::AffiliateClaims, candidates)],
            Vec::new(),
        );

        let expected = if distinct > 1 {
            if distinct > threshold { ConflictSeverity::High } else { ConflictSeverity::Medium }
        } else {
            ConflictSeverity::None
        };
        prop_assert_eq!(report.conflict_severity, expected);
    }

    /// Injecting candidates with unresolvable names or emails never changes
    /// the analysis.
    #[test]
    fn prop_malformed_rows_are_idempotent(
        distinct in 0usize..5,
        noise in 0usize..5,
    ) {
        let clean: Vec<_> = (0..distinct).map(|i| claim(&format!("a{i}@x.com"))).collect();
        let mut noisy = clean.clone();
        for i in 0..noise {
            let mut broken = claim(&format!("noise{i}@x.com"));
            if i % 2 == 0 {
                broken.email = None;
            } else {
                broken.name = None;
            }
            noisy.push(broken);
        }

        let clean_report = analyze(clean);
        let noisy_report = analyze(noisy);

        prop_assert_eq!(clean_report.analysis_summary, noisy_report.analysis_summary);
        prop_assert_eq!(clean_report.conflict_detected, noisy_report.conflict_detected);
    }
}
