//! Referral lookup endpoint.
//!
//! `GET /lookup` renders the admin page; `POST /lookup` takes a
//! form-encoded body with an `action` field and answers JSON envelopes with
//! a `status` of `success`, `error` or `not_found`.

use axum::{
    Form, Json, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::extractors::AdminContext;
use crate::{AppState, page};
use reflens_core::referral::{
    ConflictAnalyzer, ConflictPolicy, not_found_suggestions, validate_client_email,
    validate_search_term,
};
use reflens_db::repositories::AuditEntry;
use reflens_db::{
    AuditLogRepository, ClientRepository, ConflictSourceRepository, ReferralRepository,
};

/// Creates the lookup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/lookup", get(render_page).post(dispatch))
}

/// Form-encoded action request from the admin page.
#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
    term: Option<String>,
    client_id: Option<i32>,
    client_email: Option<String>,
}

/// Generic error envelope; the embedded page script reads `status`.
fn err(message: impl Into<String>) -> Response {
    Json(json!({ "status": "error", "message": message.into() })).into_response()
}

fn client_json(client: &reflens_db::entities::clients::Model) -> serde_json::Value {
    json!({
        "id": client.id,
        "name": client.display_name(),
        "email": client.email,
        "company": client.company_name,
        "created": format_date(&client.created_at),
        "status": client.status,
    })
}

fn format_date(ts: &DateTimeWithTimeZone) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// POST `/lookup` - dispatches one admin action.
async fn dispatch(
    State(state): State<AppState>,
    admin: AdminContext,
    Form(req): Form<ActionRequest>,
) -> Response {
    match req.action.as_str() {
        "search_clients" => search_clients(&state, req.term.as_deref().unwrap_or_default()).await,
        "get_referral_details" => match req.client_id {
            Some(client_id) => referral_details(&state, &admin, client_id).await,
            None => err("client_id is required"),
        },
        "get_referral_tree" => match req.client_id {
            Some(client_id) => referral_tree(&state, client_id).await,
            None => err("client_id is required"),
        },
        "check_referral_conflicts" => match req.client_email {
            Some(ref email) => check_conflicts(&state, email).await,
            None => err("client_email is required"),
        },
        "debug_affiliate_data" => match req.client_id {
            Some(client_id) => debug_affiliate_data(&state, client_id).await,
            None => err("client_id is required"),
        },
        other => err(format!("Invalid action: {other}")),
    }
}

/// `search_clients` - substring search with referral annotations.
async fn search_clients(state: &AppState, raw_term: &str) -> Response {
    let term = match validate_search_term(raw_term) {
        Ok(term) => term,
        Err(e) => return err(e.to_string()),
    };

    let client_repo = ClientRepository::new((*state.db).clone());
    let referral_repo = ReferralRepository::new((*state.db).clone());

    let clients = match client_repo.search(term, state.lookup.search_limit).await {
        Ok(clients) => clients,
        Err(e) => {
            error!(error = %e, "Client search failed");
            return err("Search failed");
        }
    };

    let mut rows = Vec::with_capacity(clients.len());
    for client in clients {
        let referrer = match referral_repo.referrer_for_client(client.id).await {
            Ok(referrer) => referrer,
            Err(e) => {
                error!(error = %e, client_id = client.id, "Referrer lookup failed");
                return err("Search failed");
            }
        };
        let is_affiliate = match referral_repo.is_affiliate(client.id).await {
            Ok(flag) => flag,
            Err(e) => {
                error!(error = %e, client_id = client.id, "Affiliate check failed");
                return err("Search failed");
            }
        };

        let mut row = client_json(&client);
        let extra = json!({
            "has_referrer": referrer.is_some(),
            "referrer_name": referrer.as_ref().map(|r| r.name.clone()),
            "referrer_email": referrer.map(|r| r.email),
            "is_affiliate": is_affiliate,
        });
        merge(&mut row, extra);
        rows.push(row);
    }

    info!(term = %term, results = rows.len(), "Client search");

    Json(json!({ "status": "success", "data": rows })).into_response()
}

/// `get_referral_details` - full referral profile for one client.
async fn referral_details(state: &AppState, admin: &AdminContext, client_id: i32) -> Response {
    let client_repo = ClientRepository::new((*state.db).clone());
    let referral_repo = ReferralRepository::new((*state.db).clone());

    let client = match client_repo.find_by_id(client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            return Json(json!({ "status": "not_found", "message": "Client not found" }))
                .into_response();
        }
        Err(e) => {
            error!(error = %e, client_id, "Client lookup failed");
            return err("Failed to get referral details");
        }
    };

    let referrer = match referral_repo.referrer_for_client(client_id).await {
        Ok(referrer) => referrer,
        Err(e) => {
            error!(error = %e, client_id, "Referrer lookup failed");
            return err("Failed to get referral details");
        }
    };

    let stats = match referral_repo
        .affiliate_stats(client_id, state.capabilities.affiliate_history)
        .await
    {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, client_id, "Affiliate stats lookup failed");
            return err("Failed to get referral details");
        }
    };

    let (total_services, total_invoices) = match (
        client_repo.service_count(client_id).await,
        client_repo.invoice_count(client_id).await,
    ) {
        (Ok(services), Ok(invoices)) => (services, invoices),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, client_id, "Usage count failed");
            return err("Failed to get referral details");
        }
    };

    if state.lookup.audit_log_enabled {
        let audit_repo = AuditLogRepository::new((*state.db).clone());
        if let Err(e) = audit_repo
            .append(AuditEntry {
                admin_id: admin.admin_id,
                admin_name: admin.admin_name.clone(),
                client_id,
                action: "view_details".to_string(),
                search_term: None,
                ip_address: admin.ip_address.clone(),
            })
            .await
        {
            // The lookup itself already succeeded
            warn!(error = %e, client_id, "Failed to append audit row");
        }
    }

    info!(
        client_id,
        admin_id = admin.admin_id,
        has_referrer = referrer.is_some(),
        "Referral details viewed"
    );

    Json(json!({
        "status": "success",
        "client": client_json(&client),
        "referral_info": {
            "has_referrer": referrer.is_some(),
            "referrer": referrer,
            "is_affiliate": stats.is_some(),
            "affiliate_stats": stats,
        },
        "statistics": {
            "total_services": total_services,
            "total_invoices": total_invoices,
        },
    }))
    .into_response()
}

/// `get_referral_tree` - clients referred by this client, bounded depth.
async fn referral_tree(state: &AppState, client_id: i32) -> Response {
    let referral_repo = ReferralRepository::new((*state.db).clone());

    match referral_repo
        .referral_tree(client_id, state.lookup.tree_max_depth)
        .await
    {
        Ok(tree) => Json(json!({ "status": "success", "data": tree })).into_response(),
        Err(e) => {
            error!(error = %e, client_id, "Referral tree walk failed");
            err("Failed to build referral tree")
        }
    }
}

/// `check_referral_conflicts` - multi-source conflict analysis by email.
async fn check_conflicts(state: &AppState, raw_email: &str) -> Response {
    let email = match validate_client_email(raw_email) {
        Ok(email) => email,
        Err(e) => return err(e.to_string()),
    };

    let client_repo = ClientRepository::new((*state.db).clone());
    let client = match client_repo.find_by_email(email).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            return Json(json!({
                "status": "not_found",
                "message": format!("Client with email '{email}' not found in database"),
                "suggestions": not_found_suggestions(),
            }))
            .into_response();
        }
        Err(e) => {
            error!(error = %e, "Client lookup failed");
            return err("Failed to check referral conflicts");
        }
    };

    let conflict_repo = ConflictSourceRepository::new((*state.db).clone());
    let sources = conflict_repo.gather(&client, &state.capabilities).await;
    let additional = conflict_repo
        .additional_sources(client.id, &state.capabilities)
        .await;

    let analyzer = ConflictAnalyzer::new(ConflictPolicy {
        high_threshold: state.lookup.conflict_high_threshold,
    });
    let report = analyzer.analyze(sources, additional);

    info!(
        client_id = client.id,
        conflict = report.conflict_detected,
        claims = report.analysis_summary.total_claims,
        "Conflict analysis"
    );

    Json(json!({
        "status": "success",
        "client": client_json(&client),
        "referral_analysis": report,
    }))
    .into_response()
}

/// `debug_affiliate_data` - raw per-table dump for support debugging.
async fn debug_affiliate_data(state: &AppState, client_id: i32) -> Response {
    let client_repo = ClientRepository::new((*state.db).clone());
    let client = match client_repo.find_by_id(client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            return Json(json!({ "status": "not_found", "message": "Client not found" }))
                .into_response();
        }
        Err(e) => {
            error!(error = %e, client_id, "Client lookup failed");
            return err("Failed to collect debug data");
        }
    };

    let conflict_repo = ConflictSourceRepository::new((*state.db).clone());
    match conflict_repo
        .debug_snapshot(&client, &state.capabilities)
        .await
    {
        Ok(data) => Json(json!({
            "status": "success",
            "client": client_json(&client),
            "data": data,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, client_id, "Debug snapshot failed");
            err("Failed to collect debug data")
        }
    }
}

/// GET `/lookup` - the server-rendered admin page.
async fn render_page(State(state): State<AppState>) -> Html<String> {
    let client_repo = ClientRepository::new((*state.db).clone());
    let referral_repo = ReferralRepository::new((*state.db).clone());

    let client_count = match client_repo.count_clients().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Client count failed");
            0
        }
    };
    let affiliate_count = match referral_repo.count_affiliates().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Affiliate count failed");
            0
        }
    };

    Html(page::render(&state.lookup, client_count, affiliate_count))
}

fn merge(target: &mut serde_json::Value, extra: serde_json::Value) {
    if let (Some(target), Some(extra)) = (target.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let ts: DateTimeWithTimeZone = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 8, 6, 12, 0, 0)
            .unwrap();
        assert_eq!(format_date(&ts), "Aug 6, 2026");
    }

    #[test]
    fn test_merge_objects() {
        let mut base = json!({ "a": 1 });
        merge(&mut base, json!({ "b": 2 }));
        assert_eq!(base, json!({ "a": 1, "b": 2 }));
    }
}
