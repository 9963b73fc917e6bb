//! Originating-host extraction for ingest requests.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Header a client may set to name itself explicitly.
pub const CLIENT_HOSTNAME_HEADER: &str = "x-client-hostname";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Hostname recorded on records created by this request.
///
/// Resolved from `X-Client-Hostname`, then the first `X-Forwarded-For` hop,
/// then the peer address, and finally `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHost(pub String);

impl ClientHost {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let from_header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(host) = from_header(CLIENT_HOSTNAME_HEADER) {
            return Self(host.to_string());
        }

        if let Some(first_hop) = from_header(FORWARDED_FOR_HEADER)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return Self(first_hop.to_string());
        }

        match peer {
            Some(addr) => Self(addr.ip().to_string()),
            None => Self("unknown".to_string()),
        }
    }
}

impl<S> FromRequestParts<S> for ClientHost
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::resolve(&parts.headers, peer))
    }
}
