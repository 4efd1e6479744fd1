//! Database seeder for Reflens development and testing.
//!
//! Creates the demo host billing schema and a small cast of clients,
//! affiliates and claims, including one deliberately conflicted client for
//! exercising the conflict checker.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, QueryFilter, Set, Statement,
};

use reflens_db::entities::{
    affiliate_claims, affiliate_history, affiliate_referrer_entries, affiliates, clients,
    custom_field_values, custom_fields, invoices, services, ticket_replies,
};

/// Marker email; when present the database is considered seeded.
const MARKER_EMAIL: &str = "alice@reflens.dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = reflens_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Creating demo host schema...");
    reflens_db::bootstrap::ensure_host_schema(&db)
        .await
        .expect("Failed to create demo host schema");

    if clients::Entity::find()
        .filter(clients::Column::Email.eq(MARKER_EMAIL))
        .one(&db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("Demo data already present, skipping...");
        return;
    }

    println!("Seeding demo clients and referrals...");
    seed_demo_data(&db).await;

    println!("Seeding complete!");
}

async fn seed_client(db: &DatabaseConnection, first: &str, last: &str, email: &str) -> clients::Model {
    clients::ActiveModel {
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        company_name: Set(String::new()),
        email: Set(email.to_string()),
        status: Set("Active".to_string()),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert client")
}

async fn seed_affiliate(db: &DatabaseConnection, client_id: i32) -> affiliates::Model {
    affiliates::ActiveModel {
        client_id: Set(client_id),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert affiliate")
}

async fn seed_claimed_service(
    db: &DatabaseConnection,
    owner_id: i32,
    affiliate_id: i32,
    domain: &str,
) {
    let service = services::ActiveModel {
        client_id: Set(owner_id),
        domain: Set(Some(domain.to_string())),
        status: Set("Active".to_string()),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert service");

    affiliate_claims::ActiveModel {
        affiliate_id: Set(affiliate_id),
        service_id: Set(service.id),
        last_paid: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert claim");
}

#[allow(clippy::too_many_lines)]
async fn seed_demo_data(db: &DatabaseConnection) {
    let alice = seed_client(db, "Alice", "Anders", MARKER_EMAIL).await;
    let bob = seed_client(db, "Bob", "Berg", "bob@reflens.dev").await;
    let carol = seed_client(db, "Carol", "Chase", "carol@reflens.dev").await;
    let dave = seed_client(db, "Dave", "Dunn", "dave@reflens.dev").await;
    let erin = seed_client(db, "Erin", "Ellis", "erin@reflens.dev").await;
    seed_client(db, "Frank", "Field", "frank@reflens.dev").await;

    // Alice and Erin are affiliates
    let alice_affiliate = seed_affiliate(db, alice.id).await;
    let erin_affiliate = seed_affiliate(db, erin.id).await;

    // Alice referred Bob and Carol
    seed_claimed_service(db, bob.id, alice_affiliate.id, "bob.example.net").await;
    seed_claimed_service(db, carol.id, alice_affiliate.id, "carol.example.net").await;

    // Carol is conflicted: a legacy referrer points at Dave...
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "UPDATE clients SET referrer_id = $1 WHERE id = $2",
        [dave.id.into(), carol.id.into()],
    ))
    .await
    .expect("Failed to set legacy referrer");

    // ...and a commission-history row credits Erin for her as well
    affiliate_history::ActiveModel {
        affiliate_id: Set(erin_affiliate.id),
        client_id: Set(carol.id),
        amount: Set(Decimal::from_str("25.00").expect("valid amount")),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert history row");

    // Alice's own commission history
    affiliate_history::ActiveModel {
        affiliate_id: Set(alice_affiliate.id),
        client_id: Set(bob.id),
        amount: Set(Decimal::from_str("12.50").expect("valid amount")),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert history row");

    // A referrer entry recording Alice -> Bob in the legacy side table
    affiliate_referrer_entries::ActiveModel {
        referrer_client_id: Set(alice.id),
        referred_client_id: Set(bob.id),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert referrer entry");

    // Free-text evidence for the conflict checker's additional sources
    let field = custom_fields::ActiveModel {
        field_type: Set("client".to_string()),
        field_name: Set("Referred By".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert custom field");
    custom_field_values::ActiveModel {
        field_id: Set(field.id),
        client_id: Set(carol.id),
        value: Set("a colleague of Dave".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert custom field value");
    ticket_replies::ActiveModel {
        client_id: Set(carol.id),
        message: Set("I think I was referred by Erin's affiliate link".to_string()),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert ticket reply");

    // A few invoices for usage counts
    for client_id in [alice.id, bob.id, carol.id] {
        invoices::ActiveModel {
            client_id: Set(client_id),
            status: Set("Paid".to_string()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to insert invoice");
    }

    println!("  Seeded 6 clients, 2 affiliates, and a conflicted referral for carol@reflens.dev");
}
