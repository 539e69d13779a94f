//! Client IP extraction and normalization for rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;

/// Number of leading IPv6 segments kept when normalizing (a /64 prefix).
const IPV6_PREFIX_SEGMENTS: usize = 4;

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

/// Extract client IP from request headers or connection info.
///
/// When `trust_proxy` is true, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise the peer address is used, or 127.0.0.1 if unknown.
pub fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> IpAddr {
    let forwarded = trust_proxy
        .then(|| header_ip(headers, "X-Forwarded-For").or_else(|| header_ip(headers, "X-Real-IP")))
        .flatten();

    forwarded
        .or_else(|| connect_info.map(|c| c.0.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Normalize IP address for rate limiting.
///
/// IPv6 addresses collapse to their /64 prefix so one allocation shares a
/// single bucket.
pub fn normalize_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            let prefix: Vec<String> = v6.segments()[..IPV6_PREFIX_SEGMENTS]
                .iter()
                .map(|s| format!("{s:x}"))
                .collect();
            format!("{}::/64", prefix.join(":"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    fn peer() -> ConnectInfo<SocketAddr> {
        ConnectInfo(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 12345))
    }

    #[test]
    fn test_normalize_ipv4() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(normalize_ip(ip), "192.168.1.100");
    }

    #[test]
    fn test_normalize_ipv6_shares_prefix() {
        let a = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0x85a3, 0x1234, 0, 0, 0, 1));
        let b = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0x85a3, 0x1234, 9, 9, 9, 9));
        assert_eq!(normalize_ip(a), "2001:db8:85a3:1234::/64");
        assert_eq!(normalize_ip(a), normalize_ip(b));
    }

    #[test]
    fn test_forwarded_for_only_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "203.0.113.50, 70.41.3.18".parse().unwrap());
        headers.insert("X-Real-IP", "198.51.100.25".parse().unwrap());

        assert_eq!(
            extract_client_ip(&headers, Some(&peer()), true),
            IpAddr::V4(Ipv4Addr::new(203, 0, 113, 50))
        );
        assert_eq!(
            extract_client_ip(&headers, Some(&peer()), false),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "not-an-ip".parse().unwrap());
        headers.insert("X-Real-IP", "198.51.100.25".parse().unwrap());

        assert_eq!(
            extract_client_ip(&headers, Some(&peer()), true),
            IpAddr::V4(Ipv4Addr::new(198, 51, 100, 25))
        );
    }

    #[test]
    fn test_localhost_when_nothing_known() {
        assert_eq!(
            extract_client_ip(&HeaderMap::new(), None, true),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }
}
