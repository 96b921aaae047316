//! Client key resolution for rate limiting.
//!
//! The login rate limiter buckets callers by client key: the first address
//! in `X-Forwarded-For` if present, else `X-Real-IP`, else the peer socket
//! address. Behind a reverse proxy the forwarding headers identify the real
//! client; without one the peer address does.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

/// Fallback key when no address information is available at all.
const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Axum extractor resolving the rate-limit key for a request.
///
/// Never fails: a request with no usable address lands in a shared
/// "unknown" bucket rather than bypassing the limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKey(resolve(parts)))
    }
}

fn resolve(parts: &Parts) -> String {
    if let Some(forwarded) = header_value(parts, "x-forwarded-for") {
        // First entry is the originating client; later hops append.
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = header_value(parts, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_CLIENT_KEY.to_string(), |ci| ci.0.ip().to_string())
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}
