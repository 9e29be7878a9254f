//! Engagement identity: who a like or view is attributed to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of user-agent characters kept in an anonymous fingerprint.
pub const USER_AGENT_PREFIX_LEN: usize = 50;

const ANONYMOUS_AGENT: &str = "anonymous";
const UNKNOWN_IP: &str = "unknown";

/// What the HTTP layer knows about the caller of a single request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext<'a> {
    /// Authenticated user id, if an upstream auth layer supplied one.
    pub user_id: Option<&'a str>,
    pub client_ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Key used to deduplicate likes and views.
///
/// Anonymous visitors are fingerprinted by IP and a truncated user agent. Visitors
/// behind the same NAT with the same browser share a fingerprint; this is a
/// best-effort identity, not a unique-visitor guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementIdentity {
    User(String),
    Visitor { ip: String, agent: String },
}

impl EngagementIdentity {
    /// Derive the identity for a request.
    pub fn resolve(ctx: &RequestContext<'_>) -> Self {
        if let Some(user_id) = ctx.user_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Self::User(user_id.to_string());
        }

        let ip = ctx
            .client_ip
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(UNKNOWN_IP);
        let agent: String = ctx
            .user_agent
            .unwrap_or_default()
            .chars()
            .take(USER_AGENT_PREFIX_LEN)
            .collect();

        Self::Visitor {
            ip: ip.to_string(),
            agent: if agent.is_empty() {
                ANONYMOUS_AGENT.to_string()
            } else {
                agent
            },
        }
    }

    /// Stored string form. User and visitor keys live in separate namespaces.
    pub fn key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Visitor { ip, agent } => format!("visitor:{ip}-{agent}"),
        }
    }
}

impl fmt::Display for EngagementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
