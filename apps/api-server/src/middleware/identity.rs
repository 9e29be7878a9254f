//! Caller identity extractor for engagement endpoints.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use quill_core::domain::{EngagementIdentity, RequestContext};

use crate::state::AppState;

/// How the caller's identity is read off a request.
///
/// The user header is only safe behind a gateway that authenticates the caller
/// and overwrites the header on every request. Without one, any client can
/// claim any user id, so it stays unset by default and every caller is an
/// anonymous visitor.
#[derive(Debug, Clone, Default)]
pub struct IdentityConfig {
    /// Header carrying the user id, set by the upstream auth layer.
    pub user_header: Option<String>,
    /// Take the client IP from `Forwarded`/`X-Forwarded-For` instead of the peer address.
    pub trust_proxy: bool,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            user_header: std::env::var("IDENTITY_USER_HEADER")
                .ok()
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty()),
            trust_proxy: std::env::var("TRUST_PROXY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

/// The identity a like or view is attributed to.
///
/// Never fails: a request without a trusted user header resolves to an anonymous visitor.
/// ```ignore
/// async fn like(caller: Caller) -> impl Responder {
///     format!("liked as {}", caller.0)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub EngagementIdentity);

impl Caller {
    fn resolve(req: &HttpRequest, config: &IdentityConfig) -> Self {
        let header_str = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

        let client_ip = if config.trust_proxy {
            req.connection_info()
                .realip_remote_addr()
                .map(str::to_string)
        } else {
            req.peer_addr().map(|addr| addr.ip().to_string())
        };

        let ctx = RequestContext {
            user_id: config.user_header.as_deref().and_then(header_str),
            client_ip: client_ip.as_deref(),
            user_agent: header_str(header::USER_AGENT.as_str()),
        };
        Self(EngagementIdentity::resolve(&ctx))
    }
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let caller = match req.app_data::<web::Data<AppState>>() {
            Some(state) => Self::resolve(req, &state.identity),
            None => Self::resolve(req, &IdentityConfig::default()),
        };
        ready(Ok(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn resolve(req: TestRequest, config: &IdentityConfig) -> EngagementIdentity {
        Caller::resolve(&req.to_http_request(), config).0
    }

    fn trusting(header: &str) -> IdentityConfig {
        IdentityConfig {
            user_header: Some(header.to_string()),
            trust_proxy: false,
        }
    }

    #[test]
    fn test_user_header_ignored_by_default() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.5:41000".parse().expect("socket addr"))
            .insert_header(("x-user-id", "u-7"))
            .insert_header((header::USER_AGENT, "curl/8"));
        assert_eq!(
            resolve(req, &IdentityConfig::default()).key(),
            "visitor:10.0.0.5-curl/8"
        );
    }

    #[test]
    fn test_configured_user_header_wins() {
        let req = TestRequest::default()
            .insert_header(("x-user-id", "u-7"))
            .insert_header((header::USER_AGENT, "curl/8"));
        assert_eq!(
            resolve(req, &trusting("x-user-id")),
            EngagementIdentity::User("u-7".to_string())
        );
    }

    #[test]
    fn test_only_the_configured_header_is_read() {
        let req = TestRequest::default()
            .insert_header(("x-user-id", "ignored"))
            .insert_header(("x-auth-subject", "u-9"));
        assert_eq!(resolve(req, &trusting("x-auth-subject")).key(), "user:u-9");
    }

    #[test]
    fn test_visitor_from_peer_address() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.5:41000".parse().expect("socket addr"))
            .insert_header((header::USER_AGENT, "Mozilla/5.0"))
            .insert_header(("x-forwarded-for", "203.0.113.9"));
        assert_eq!(
            resolve(req, &IdentityConfig::default()).key(),
            "visitor:10.0.0.5-Mozilla/5.0"
        );
    }

    #[test]
    fn test_forwarded_for_when_proxy_trusted() {
        let config = IdentityConfig {
            trust_proxy: true,
            ..IdentityConfig::default()
        };
        let req = TestRequest::default()
            .peer_addr("10.0.0.5:41000".parse().expect("socket addr"))
            .insert_header(("x-forwarded-for", "203.0.113.9"));
        assert_eq!(
            resolve(req, &config).key(),
            "visitor:203.0.113.9-anonymous"
        );
    }

    #[test]
    fn test_no_peer_is_unknown() {
        let req = TestRequest::default();
        assert_eq!(
            resolve(req, &IdentityConfig::default()).key(),
            "visitor:unknown-anonymous"
        );
    }
}
