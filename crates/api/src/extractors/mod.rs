//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

/// Identity of the acting admin, forwarded by the fronting admin panel.
///
/// Carried explicitly into audit-log writes; nothing reads ambient request
/// state. The service itself does not authenticate admins, the fronting
/// panel does.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// Admin id from `x-admin-id`; 0 when absent or malformed.
    pub admin_id: i32,
    /// Admin username from `x-admin-username`.
    pub admin_name: String,
    /// Requesting address from `x-forwarded-for` (first hop) or `x-real-ip`.
    pub ip_address: String,
}

impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let admin_id = header("x-admin-id")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let admin_name = header("x-admin-username").unwrap_or("unknown").to_string();
        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .or_else(|| header("x-real-ip"))
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            admin_id,
            admin_name,
            ip_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    async fn extract(builder: axum::http::request::Builder) -> AdminContext {
        let (mut parts, ()) = builder.body(()).expect("request builds").into_parts();
        AdminContext::from_request_parts(&mut parts, &())
            .await
            .expect("extraction is infallible")
    }

    #[tokio::test]
    async fn test_reads_forwarded_headers() {
        let ctx = extract(
            Request::builder()
                .header("x-admin-id", "42")
                .header("x-admin-username", "support.jane")
                .header("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
        )
        .await;

        assert_eq!(ctx.admin_id, 42);
        assert_eq!(ctx.admin_name, "support.jane");
        assert_eq!(ctx.ip_address, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_defaults_when_headers_absent() {
        let ctx = extract(Request::builder()).await;

        assert_eq!(ctx.admin_id, 0);
        assert_eq!(ctx.admin_name, "unknown");
        assert_eq!(ctx.ip_address, "unknown");
    }

    #[tokio::test]
    async fn test_malformed_admin_id_falls_back() {
        let ctx = extract(
            Request::builder()
                .header("x-admin-id", "not-a-number")
                .header("x-real-ip", "198.51.100.4"),
        )
        .await;

        assert_eq!(ctx.admin_id, 0);
        assert_eq!(ctx.ip_address, "198.51.100.4");
    }
}
