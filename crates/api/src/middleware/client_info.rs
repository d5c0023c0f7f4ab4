//! Client metadata recorded on new sessions.
//!
//! Descriptive only: nothing here participates in authentication.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Longest user-agent string stored with a session.
const MAX_USER_AGENT_LEN: usize = 512;

/// Client address and user agent of the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// First `X-Forwarded-For` hop, else `X-Real-IP`, else the peer address.
    /// Empty if none is known.
    pub ip: String,
    pub user_agent: String,
}

impl ClientInfo {
    fn from_parts(parts: &Parts) -> Self {
        let ip = forwarded_ip(&parts.headers)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect())
            .unwrap_or_default();

        Self { ip, user_agent }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_value(headers, "x-real-ip"))
        .map(str::to_owned)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn prefers_first_forwarded_hop() {
        let p = parts(
            Request::builder()
                .header("x-forwarded-for", " 203.0.113.7 , 10.0.0.1")
                .header("x-real-ip", "198.51.100.2")
                .header(USER_AGENT, "curl/8.0"),
        );
        let info = ClientInfo::from_parts(&p);
        assert_eq!(info.ip, "203.0.113.7");
        assert_eq!(info.user_agent, "curl/8.0");
    }

    #[test]
    fn falls_back_to_real_ip_then_peer() {
        let p = parts(Request::builder().header("x-real-ip", "198.51.100.2"));
        assert_eq!(ClientInfo::from_parts(&p).ip, "198.51.100.2");

        let mut p = parts(Request::builder());
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        p.extensions.insert(ConnectInfo(peer));
        assert_eq!(ClientInfo::from_parts(&p).ip, "192.0.2.1");
    }

    #[test]
    fn missing_everything_is_empty() {
        let p = parts(Request::builder());
        assert_eq!(ClientInfo::from_parts(&p), ClientInfo::default());
    }

    #[test]
    fn long_user_agent_is_truncated() {
        let ua = "x".repeat(MAX_USER_AGENT_LEN + 100);
        let p = parts(Request::builder().header(USER_AGENT, ua.as_str()));
        assert_eq!(ClientInfo::from_parts(&p).user_agent.len(), MAX_USER_AGENT_LEN);
    }
}
