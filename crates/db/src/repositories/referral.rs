//! Referral resolution: claims, affiliate stats, and the bounded tree walk.

use std::future::Future;
use std::pin::Pin;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::entities::{affiliate_claims, affiliate_history, affiliates, clients, services};

/// The resolved referrer of a client, via the first matching claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerInfo {
    /// Referring client id.
    pub id: i32,
    /// Referring client display name.
    pub name: String,
    /// Referring client email.
    pub email: String,
    /// The crediting affiliate id.
    pub affiliate_id: i32,
    /// The claimed service id.
    pub service_id: i32,
    /// When the claim was last paid out, if ever.
    pub last_paid: Option<sea_orm::prelude::DateTimeWithTimeZone>,
}

/// Aggregate statistics for a client who is an affiliate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffiliateStats {
    /// Claims credited to this affiliate.
    pub total_referrals: u64,
    /// Sum of historical commission amounts.
    pub total_commissions: Decimal,
    /// When the affiliate account was created.
    pub signup_date: sea_orm::prelude::DateTimeWithTimeZone,
}

/// One node of the referral tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Referred client id.
    pub id: i32,
    /// Referred client display name.
    pub name: String,
    /// Referred client email.
    pub email: String,
    /// Referred client signup date.
    pub created: sea_orm::prelude::DateTimeWithTimeZone,
    /// Depth of this node, root children at 1.
    pub level: u32,
    /// Clients referred by this node, one level deeper.
    pub children: Vec<TreeNode>,
}

/// Repository over the affiliate linkage tables.
#[derive(Debug, Clone)]
pub struct ReferralRepository {
    db: DatabaseConnection,
}

impl ReferralRepository {
    /// Creates a new referral repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ids of every service owned by a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn service_ids(&self, client_id: i32) -> Result<Vec<i32>, DbErr> {
        let ids: Vec<i32> = services::Entity::find()
            .filter(services::Column::ClientId.eq(client_id))
            .select_only()
            .column(services::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }

    /// The affiliate record for a client, if the client is an affiliate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn affiliate_for_client(
        &self,
        client_id: i32,
    ) -> Result<Option<affiliates::Model>, DbErr> {
        affiliates::Entity::find()
            .filter(affiliates::Column::ClientId.eq(client_id))
            .one(&self.db)
            .await
    }

    /// Whether a client is registered as an affiliate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_affiliate(&self, client_id: i32) -> Result<bool, DbErr> {
        Ok(self.affiliate_for_client(client_id).await?.is_some())
    }

    /// Total number of affiliates; shown on the admin landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_affiliates(&self) -> Result<u64, DbErr> {
        affiliates::Entity::find().count(&self.db).await
    }

    /// Resolves the referrer credited for a client, if any.
    ///
    /// Follows the first claim (lowest claim id) over any of the client's
    /// services through the affiliate record to the affiliate's own client
    /// row. Any broken link along the way resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn referrer_for_client(
        &self,
        client_id: i32,
    ) -> Result<Option<ReferrerInfo>, DbErr> {
        let service_ids = self.service_ids(client_id).await?;
        if service_ids.is_empty() {
            return Ok(None);
        }

        let Some(claim) = affiliate_claims::Entity::find()
            .filter(affiliate_claims::Column::ServiceId.is_in(service_ids))
            .order_by_asc(affiliate_claims::Column::Id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(affiliate) = affiliates::Entity::find_by_id(claim.affiliate_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(referrer) = clients::Entity::find_by_id(affiliate.client_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(ReferrerInfo {
            id: referrer.id,
            name: referrer.display_name(),
            email: referrer.email,
            affiliate_id: affiliate.id,
            service_id: claim.service_id,
            last_paid: claim.last_paid,
        }))
    }

    /// Aggregate statistics when the client is an affiliate.
    ///
    /// `history_available` comes from the startup capability probe; without
    /// the history table the commission sum is reported as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn affiliate_stats(
        &self,
        client_id: i32,
        history_available: bool,
    ) -> Result<Option<AffiliateStats>, DbErr> {
        let Some(affiliate) = self.affiliate_for_client(client_id).await? else {
            return Ok(None);
        };

        let total_referrals = affiliate_claims::Entity::find()
            .filter(affiliate_claims::Column::AffiliateId.eq(affiliate.id))
            .count(&self.db)
            .await?;

        let total_commissions = if history_available {
            let rows = affiliate_history::Entity::find()
                .filter(affiliate_history::Column::AffiliateId.eq(affiliate.id))
                .all(&self.db)
                .await?;
            rows.iter().map(|r| r.amount).sum()
        } else {
            Decimal::ZERO
        };

        Ok(Some(AffiliateStats {
            total_referrals,
            total_commissions,
            signup_date: affiliate.created_at,
        }))
    }

    /// Builds the referral tree rooted at a client.
    ///
    /// Children are the owners of every service credited to the client's
    /// affiliate id, one node per claimed service. Recursion stops at
    /// `max_depth`; there is no cycle detection, the depth bound alone
    /// guards against cycles in the underlying data.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn referral_tree(
        &self,
        client_id: i32,
        max_depth: u32,
    ) -> Result<Vec<TreeNode>, DbErr> {
        self.walk(client_id, 0, max_depth).await
    }

    fn walk(
        &self,
        client_id: i32,
        level: u32,
        max_depth: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TreeNode>, DbErr>> + Send + '_>> {
        Box::pin(async move {
            if level > max_depth {
                return Ok(Vec::new());
            }

            let Some(affiliate) = self.affiliate_for_client(client_id).await? else {
                return Ok(Vec::new());
            };

            let referred_service_ids: Vec<i32> = affiliate_claims::Entity::find()
                .filter(affiliate_claims::Column::AffiliateId.eq(affiliate.id))
                .select_only()
                .column(affiliate_claims::Column::ServiceId)
                .into_tuple()
                .all(&self.db)
                .await?;
            if referred_service_ids.is_empty() {
                return Ok(Vec::new());
            }

            let referred_services = services::Entity::find()
                .filter(services::Column::Id.is_in(referred_service_ids))
                .all(&self.db)
                .await?;

            let mut nodes = Vec::new();
            for service in referred_services {
                let Some(client) = clients::Entity::find_by_id(service.client_id)
                    .one(&self.db)
                    .await?
                else {
                    continue;
                };

                let children = self.walk(client.id, level + 1, max_depth).await?;
                nodes.push(TreeNode {
                    id: client.id,
                    name: client.display_name(),
                    email: client.email,
                    created: client.created_at,
                    level: level + 1,
                    children,
                });
            }
            Ok(nodes)
        })
    }
}
