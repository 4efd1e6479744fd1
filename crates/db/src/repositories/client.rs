//! Client repository for search and profile lookups.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{clients, invoices, services};

/// Client repository for read-only lookups against the host schema.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Case-insensitive substring search over name, email and company.
    ///
    /// Results are capped at `limit` rows, newest client id first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(&self, term: &str, limit: u64) -> Result<Vec<clients::Model>, DbErr> {
        let pattern = format!("%{}%", term.to_lowercase());
        let matches = |column: clients::Column| {
            Expr::expr(Func::lower(Expr::col((clients::Entity, column)))).like(pattern.clone())
        };

        clients::Entity::find()
            .filter(
                Condition::any()
                    .add(matches(clients::Column::FirstName))
                    .add(matches(clients::Column::LastName))
                    .add(matches(clients::Column::Email))
                    .add(matches(clients::Column::CompanyName)),
            )
            .order_by_desc(clients::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Finds a client by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<clients::Model>, DbErr> {
        clients::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a client by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<clients::Model>, DbErr> {
        clients::Entity::find()
            .filter(clients::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Total number of clients; shown on the admin landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_clients(&self) -> Result<u64, DbErr> {
        clients::Entity::find().count(&self.db).await
    }

    /// Number of services owned by a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn service_count(&self, client_id: i32) -> Result<u64, DbErr> {
        services::Entity::find()
            .filter(services::Column::ClientId.eq(client_id))
            .count(&self.db)
            .await
    }

    /// Number of invoices raised for a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn invoice_count(&self, client_id: i32) -> Result<u64, DbErr> {
        invoices::Entity::find()
            .filter(invoices::Column::ClientId.eq(client_id))
            .count(&self.db)
            .await
    }
}
