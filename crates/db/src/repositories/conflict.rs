//! Per-source gathering of referral-conflict evidence.
//!
//! Each evidence source is consulted independently and reports an explicit
//! outcome; a source that is absent from the schema or fails to query
//! contributes zero candidates without aborting the analysis.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Statement,
};
use serde_json::{Value, json};
use tracing::warn;

use reflens_core::referral::{
    AdditionalSource, CandidateKind, EvidenceSource, ReferrerCandidate, SourceReport,
};

use crate::capabilities::SchemaCapabilities;
use crate::entities::{
    affiliate_claims, affiliate_history, affiliate_referrer_entries, affiliates, clients,
    custom_field_values, custom_fields, services, ticket_replies,
};

/// How rows of an auxiliary source point back at the referring client.
#[derive(Debug, Clone, Copy)]
enum AuxResolution {
    /// The row carries the referring client id directly.
    DirectClientId,
    /// The row carries an affiliate id, resolved through the affiliate
    /// record to its client.
    ViaAffiliateId,
}

/// Statically declared description of one auxiliary evidence source.
struct AuxSourceSpec {
    source: EvidenceSource,
    resolution: AuxResolution,
}

/// The auxiliary tables, each with its key column and resolution path.
const AUX_SOURCES: [AuxSourceSpec; 2] = [
    AuxSourceSpec {
        source: EvidenceSource::ReferrerEntries,
        resolution: AuxResolution::DirectClientId,
    },
    AuxSourceSpec {
        source: EvidenceSource::AffiliateHistory,
        resolution: AuxResolution::ViaAffiliateId,
    },
];

/// Repository gathering conflict evidence from every source.
#[derive(Debug, Clone)]
pub struct ConflictSourceRepository {
    db: DatabaseConnection,
}

impl ConflictSourceRepository {
    /// Creates a new conflict-source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Consults every evidence source for the given client.
    ///
    /// Never fails: a source whose query errors is reported unavailable and
    /// logged, matching the "missing source is not fatal" semantic.
    pub async fn gather(
        &self,
        client: &clients::Model,
        caps: &SchemaCapabilities,
    ) -> Vec<SourceReport> {
        let mut reports = Vec::with_capacity(2 + AUX_SOURCES.len());

        if caps.legacy_referrer_column {
            reports.push(self.consult(EvidenceSource::LegacyReferrerColumn, self.legacy_candidates(client)).await);
        } else {
            reports.push(SourceReport::unavailable(
                EvidenceSource::LegacyReferrerColumn,
                "clients.referrer_id column not present",
            ));
        }

        reports.push(self.consult(EvidenceSource::AffiliateClaims, self.claim_candidates(client.id)).await);

        for spec in &AUX_SOURCES {
            let enabled = match spec.source {
                EvidenceSource::ReferrerEntries => caps.referrer_entries,
                EvidenceSource::AffiliateHistory => caps.affiliate_history,
                EvidenceSource::LegacyReferrerColumn | EvidenceSource::AffiliateClaims => true,
            };
            if enabled {
                reports.push(self.consult(spec.source, self.aux_candidates(spec, client.id)).await);
            } else {
                reports.push(SourceReport::unavailable(spec.source, "table not present"));
            }
        }

        reports
    }

    async fn consult(
        &self,
        source: EvidenceSource,
        lookup: impl Future<Output = Result<Vec<ReferrerCandidate>, DbErr>>,
    ) -> SourceReport {
        match lookup.await {
            Ok(candidates) => SourceReport::available(source, candidates),
            Err(e) => {
                warn!(source = %source, error = %e, "Evidence source query failed");
                SourceReport::unavailable(source, e.to_string())
            }
        }
    }

    /// Reads the legacy `referrer_id` column through a raw statement; the
    /// column is not part of the modeled entity.
    async fn legacy_candidates(
        &self,
        client: &clients::Model,
    ) -> Result<Vec<ReferrerCandidate>, DbErr> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT referrer_id FROM clients WHERE id = $1",
                [client.id.into()],
            ))
            .await?;

        let Some(referrer_id) = row
            .map(|r| r.try_get::<Option<i32>>("", "referrer_id"))
            .transpose()?
            .flatten()
        else {
            return Ok(Vec::new());
        };

        let Some(referrer) = clients::Entity::find_by_id(referrer_id).one(&self.db).await? else {
            return Ok(Vec::new());
        };

        Ok(vec![ReferrerCandidate {
            kind: CandidateKind::DatabaseReferrer,
            name: Some(referrer.display_name()),
            email: Some(referrer.email.clone()),
            source: EvidenceSource::LegacyReferrerColumn,
            details: format!("Client ID: #{}", referrer.id),
        }])
    }

    /// Every claim over the client's services, resolved through the
    /// affiliate record. Unresolvable claims are kept with empty identity so
    /// the analyzer can discard them as noise.
    async fn claim_candidates(&self, client_id: i32) -> Result<Vec<ReferrerCandidate>, DbErr> {
        let service_ids: Vec<i32> = services::Entity::find()
            .filter(services::Column::ClientId.eq(client_id))
            .select_only()
            .column(services::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        let claims = affiliate_claims::Entity::find()
            .filter(affiliate_claims::Column::ServiceId.is_in(service_ids))
            .all(&self.db)
            .await?;

        let mut candidates = Vec::with_capacity(claims.len());
        for claim in claims {
            let identity = self.resolve_via_affiliate(claim.affiliate_id).await?;
            let last_paid = claim
                .last_paid
                .map_or_else(|| "Never".to_string(), |d| d.to_rfc3339());
            candidates.push(ReferrerCandidate {
                kind: CandidateKind::AffiliateClaim,
                name: identity.as_ref().map(|(name, _)| name.clone()),
                email: identity.map(|(_, email)| email),
                source: EvidenceSource::AffiliateClaims,
                details: format!(
                    "Affiliate ID: #{} | Service ID: #{} | Last Paid: {}",
                    claim.affiliate_id, claim.service_id, last_paid
                ),
            });
        }
        Ok(candidates)
    }

    /// One auxiliary source, driven by its declared key column and
    /// resolution path.
    async fn aux_candidates(
        &self,
        spec: &AuxSourceSpec,
        client_id: i32,
    ) -> Result<Vec<ReferrerCandidate>, DbErr> {
        // (resolution key, details) pairs keyed as the source declares
        let keyed_rows: Vec<(i32, String)> = match spec.source {
            EvidenceSource::ReferrerEntries => affiliate_referrer_entries::Entity::find()
                .filter(affiliate_referrer_entries::Column::ReferredClientId.eq(client_id))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|row| (row.referrer_client_id, format!("Entry ID: #{}", row.id)))
                .collect(),
            EvidenceSource::AffiliateHistory => affiliate_history::Entity::find()
                .filter(affiliate_history::Column::ClientId.eq(client_id))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|row| (row.affiliate_id, format!("Affiliate ID: #{}", row.affiliate_id)))
                .collect(),
            EvidenceSource::LegacyReferrerColumn | EvidenceSource::AffiliateClaims => Vec::new(),
        };

        let mut candidates = Vec::with_capacity(keyed_rows.len());
        for (key, details) in keyed_rows {
            let identity = match spec.resolution {
                AuxResolution::DirectClientId => self.client_identity(key).await?,
                AuxResolution::ViaAffiliateId => self.resolve_via_affiliate(key).await?,
            };
            candidates.push(ReferrerCandidate {
                kind: CandidateKind::AffiliateClaim,
                name: identity.as_ref().map(|(name, _)| name.clone()),
                email: identity.map(|(_, email)| email),
                source: spec.source,
                details,
            });
        }
        Ok(candidates)
    }

    async fn client_identity(&self, client_id: i32) -> Result<Option<(String, String)>, DbErr> {
        Ok(clients::Entity::find_by_id(client_id)
            .one(&self.db)
            .await?
            .map(|c| (c.display_name(), c.email)))
    }

    async fn resolve_via_affiliate(
        &self,
        affiliate_id: i32,
    ) -> Result<Option<(String, String)>, DbErr> {
        let Some(affiliate) = affiliates::Entity::find_by_id(affiliate_id).one(&self.db).await?
        else {
            return Ok(None);
        };
        self.client_identity(affiliate.client_id).await
    }

    /// Unscored free-text evidence: referral-flavored custom fields and
    /// ticket replies. Best effort; failures are logged and skipped.
    pub async fn additional_sources(
        &self,
        client_id: i32,
        caps: &SchemaCapabilities,
    ) -> Vec<AdditionalSource> {
        let mut sources = Vec::new();

        if caps.custom_fields {
            match self.custom_field_mentions(client_id).await {
                Ok(mut found) => sources.append(&mut found),
                Err(e) => warn!(error = %e, "Custom field scan failed"),
            }
        }

        if caps.ticket_replies {
            match self.ticket_mention_count(client_id).await {
                Ok(0) => {}
                Ok(count) => sources.push(AdditionalSource::ticket_mentions(count)),
                Err(e) => warn!(error = %e, "Ticket reply scan failed"),
            }
        }

        sources
    }

    async fn custom_field_mentions(
        &self,
        client_id: i32,
    ) -> Result<Vec<AdditionalSource>, DbErr> {
        let name_matches = |pattern: &str| {
            Expr::expr(Func::lower(Expr::col((
                custom_fields::Entity,
                custom_fields::Column::FieldName,
            ))))
            .like(pattern)
        };

        let fields = custom_fields::Entity::find()
            .filter(custom_fields::Column::FieldType.eq("client"))
            .filter(
                Condition::any()
                    .add(name_matches("%refer%"))
                    .add(name_matches("%affiliate%")),
            )
            .all(&self.db)
            .await?;

        let mut found = Vec::new();
        for field in fields {
            let value: Option<String> = custom_field_values::Entity::find()
                .filter(custom_field_values::Column::FieldId.eq(field.id))
                .filter(custom_field_values::Column::ClientId.eq(client_id))
                .select_only()
                .column(custom_field_values::Column::Value)
                .into_tuple()
                .one(&self.db)
                .await?;

            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                found.push(AdditionalSource::custom_field(field.field_name, value));
            }
        }
        Ok(found)
    }

    async fn ticket_mention_count(&self, client_id: i32) -> Result<u64, DbErr> {
        let body_matches = |pattern: &str| {
            Expr::expr(Func::lower(Expr::col((
                ticket_replies::Entity,
                ticket_replies::Column::Message,
            ))))
            .like(pattern)
        };

        ticket_replies::Entity::find()
            .filter(ticket_replies::Column::ClientId.eq(client_id))
            .filter(
                Condition::any()
                    .add(body_matches("%refer%"))
                    .add(body_matches("%affiliate%")),
            )
            .count(&self.db)
            .await
    }

    /// Raw per-table dump of everything affiliate-shaped for a client.
    ///
    /// Support-debugging aid behind the `debug_affiliate_data` action.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn debug_snapshot(
        &self,
        client: &clients::Model,
        caps: &SchemaCapabilities,
    ) -> Result<Value, DbErr> {
        let service_ids: Vec<i32> = services::Entity::find()
            .filter(services::Column::ClientId.eq(client.id))
            .select_only()
            .column(services::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;

        let claims = if service_ids.is_empty() {
            Vec::new()
        } else {
            affiliate_claims::Entity::find()
                .filter(affiliate_claims::Column::ServiceId.is_in(service_ids.clone()))
                .all(&self.db)
                .await?
        };

        let mut resolved_claims = Vec::with_capacity(claims.len());
        for claim in &claims {
            let identity = self.resolve_via_affiliate(claim.affiliate_id).await?;
            resolved_claims.push(json!({
                "claim": claim,
                "affiliate_name": identity.as_ref().map(|(name, _)| name.clone()),
                "affiliate_email": identity.map(|(_, email)| email),
            }));
        }

        let affiliate_record = affiliates::Entity::find()
            .filter(affiliates::Column::ClientId.eq(client.id))
            .one(&self.db)
            .await?;

        let referrer_entries = if caps.referrer_entries {
            Some(
                affiliate_referrer_entries::Entity::find()
                    .filter(affiliate_referrer_entries::Column::ReferredClientId.eq(client.id))
                    .all(&self.db)
                    .await?,
            )
        } else {
            None
        };

        let history = if caps.affiliate_history {
            Some(
                affiliate_history::Entity::find()
                    .filter(affiliate_history::Column::ClientId.eq(client.id))
                    .all(&self.db)
                    .await?,
            )
        } else {
            None
        };

        Ok(json!({
            "service_ids": service_ids,
            "affiliate_claims": resolved_claims,
            "affiliate_record": affiliate_record,
            "referrer_entries": referrer_entries,
            "affiliate_history": history,
        }))
    }
}
