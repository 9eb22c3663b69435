use axum::RequestPartsExt;
use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use axum::response::{IntoResponse, Response};
use std::net::{IpAddr, SocketAddr};

/// Single-value fallback headers, inspected in priority order when
/// `x-forwarded-for` yields nothing.
const FALLBACK_IP_HEADERS: [&str; 4] = [
    "x-real-ip",
    "x-vercel-forwarded-for",
    "x-vercel-proxied-for",
    "forwarded",
];

/// Best-effort client IP from proxy headers. Returns the first candidate
/// found, however implausible; validation is a separate step.
pub fn extract_client_ip(headers: &HeaderMap, fallback_addr: SocketAddr) -> String {
    // Check X-Forwarded-For header first (load balancer/proxy)
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            // X-Forwarded-For can contain multiple IPs, take the first
            // non-empty token (original client)
            for token in forwarded_str.split(',') {
                let token = token.trim();
                if !token.is_empty() {
                    return token.to_string();
                }
            }
        }
    }

    for name in FALLBACK_IP_HEADERS {
        let Some(value) = headers.get(name).and_then(|value| value.to_str().ok()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        // Forwarded (RFC 7239) carries the client address in a `for=` parameter
        if name == "forwarded" && value.contains("for=") {
            if let Some(ip) = forwarded_for_param(value) {
                return ip;
            }
        }
        return value.to_string();
    }

    // Fall back to direct connection IP
    fallback_addr.ip().to_string()
}

/// Pulls the `for=` value out of a `Forwarded` header such as
/// `for="[2001:db8::1]";proto=https`, unwrapping quotes and IPv6 brackets.
/// `None` when the parameter is missing or empty; the caller then uses the
/// raw header value.
fn forwarded_for_param(value: &str) -> Option<String> {
    let (_, rest) = value.split_once("for=")?;
    let token = match rest.split_once(';') {
        Some((token, _)) => token,
        None => rest,
    };
    let token = token.trim().trim_matches('"');
    let token = token.trim_matches(|c| c == '[' || c == ']');

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Syntactic IPv4/IPv6 check only. No DNS, no reachability.
pub fn is_valid_ip(candidate: &str) -> bool {
    candidate.parse::<IpAddr>().is_ok()
}

/// What the proxy chain claims about the requesting client, resolved once
/// per request and discarded with the response.
#[derive(Debug, Clone)]
pub struct ResolvedClient {
    pub ip: String,
    pub ip_is_valid: bool,
}

impl ResolvedClient {
    pub fn resolve(headers: &HeaderMap, fallback_addr: SocketAddr) -> Self {
        let ip = extract_client_ip(headers, fallback_addr);
        let ip_is_valid = is_valid_ip(&ip);
        ResolvedClient { ip, ip_is_valid }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ResolvedClient
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ConnectInfo(addr) = parts
            .extract::<ConnectInfo<SocketAddr>>()
            .await
            .map_err(|err| err.into_response())?;

        Ok(ResolvedClient::resolve(&parts.headers, addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn fallback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 8080))
    }

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in entries {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn forwarded_for_takes_the_first_token() {
        let headers = headers(&[("x-forwarded-for", "203.0.113.5, 10.0.0.1")]);
        assert_eq!(extract_client_ip(&headers, fallback()), "203.0.113.5");
    }

    #[test]
    fn forwarded_for_skips_empty_tokens() {
        let headers = headers(&[("x-forwarded-for", " , 198.51.100.7")]);
        assert_eq!(extract_client_ip(&headers, fallback()), "198.51.100.7");
    }

    #[test]
    fn all_empty_forwarded_for_falls_through_to_real_ip() {
        let headers = headers(&[("x-forwarded-for", " , "), ("x-real-ip", "198.51.100.9")]);
        assert_eq!(extract_client_ip(&headers, fallback()), "198.51.100.9");
    }

    #[test]
    fn no_headers_falls_back_to_peer_address() {
        assert_eq!(extract_client_ip(&HeaderMap::new(), fallback()), "127.0.0.1");
    }

    #[test]
    fn real_ip_wins_over_later_candidates() {
        let headers = headers(&[
            ("x-real-ip", "198.51.100.9"),
            ("forwarded", "for=203.0.113.5"),
        ]);
        assert_eq!(extract_client_ip(&headers, fallback()), "198.51.100.9");
    }

    #[test]
    fn forwarded_header_unwraps_quoted_ipv6() {
        let headers = headers(&[("forwarded", "for=\"[2001:db8::1]\";proto=https")]);
        assert_eq!(extract_client_ip(&headers, fallback()), "2001:db8::1");
    }

    #[test]
    fn forwarded_header_without_for_param_is_returned_raw() {
        let headers = headers(&[("forwarded", "proto=https;host=example.com")]);
        assert_eq!(
            extract_client_ip(&headers, fallback()),
            "proto=https;host=example.com"
        );
    }

    #[test]
    fn spoofed_garbage_is_returned_untouched() {
        let headers = headers(&[("x-forwarded-for", "not-an-ip, 203.0.113.5")]);
        assert_eq!(extract_client_ip(&headers, fallback()), "not-an-ip");
    }

    #[test]
    fn resolution_is_idempotent() {
        let headers = headers(&[("x-forwarded-for", "203.0.113.5, 10.0.0.1")]);
        assert_eq!(
            extract_client_ip(&headers, fallback()),
            extract_client_ip(&headers, fallback())
        );
    }

    #[test]
    fn validates_ip_literals_only() {
        assert!(is_valid_ip("203.0.113.5"));
        assert!(is_valid_ip("2001:db8::1"));
        assert!(!is_valid_ip("not-an-ip"));
        assert!(!is_valid_ip(""));
    }

    #[test]
    fn resolved_client_flags_validity() {
        let client =
            ResolvedClient::resolve(&headers(&[("x-real-ip", "198.51.100.9")]), fallback());
        assert_eq!(client.ip, "198.51.100.9");
        assert!(client.ip_is_valid);

        let spoofed =
            ResolvedClient::resolve(&headers(&[("x-forwarded-for", "not-an-ip")]), fallback());
        assert_eq!(spoofed.ip, "not-an-ip");
        assert!(!spoofed.ip_is_valid);
    }
}
