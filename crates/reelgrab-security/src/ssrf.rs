// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSRF guard for outbound requests.
//!
//! Post URLs come from untrusted users and strategies follow URLs found in
//! third-party responses, so every hop is checked: literal IP hosts up front
//! and on redirect, hostnames at DNS resolution time.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use reelgrab_core::ReelgrabError;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::{error, info};

/// Private addresses that may still be contacted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateAllowlist {
    ips: Vec<IpAddr>,
}

impl PrivateAllowlist {
    /// Parses the configured entries. Unparseable entries are skipped; config
    /// validation reports them before this point.
    pub fn new(entries: &[String]) -> Self {
        Self {
            ips: entries
                .iter()
                .filter_map(|s| s.parse::<IpAddr>().ok())
                .collect(),
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.ips.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}

/// DNS resolver that drops private and reserved addresses.
///
/// A hostname resolving only to blocked addresses fails to resolve, so no
/// connection is attempted.
pub struct SsrfSafeResolver {
    allowlist: Arc<PrivateAllowlist>,
}

impl SsrfSafeResolver {
    pub fn new(allowlist: Arc<PrivateAllowlist>) -> Self {
        Self { allowlist }
    }

    /// Check if an IP is in a private or reserved range.
    ///
    /// Covers RFC 1918, loopback, link-local, broadcast, unspecified, CGNAT,
    /// the cloud metadata address, and IPv6 unique-local and link-local.
    pub fn is_private(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => is_private_v4(v4),
            IpAddr::V6(v6) => {
                if let Some(mapped) = v6.to_ipv4_mapped() {
                    return is_private_v4(&mapped);
                }
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                    || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
            }
        }
    }
}

fn is_private_v4(v4: &Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_broadcast()
        || v4.is_unspecified()
        || (a == 100 && (64..128).contains(&b)) // 100.64.0.0/10 CGNAT
        || *v4 == Ipv4Addr::new(169, 254, 169, 254)
}

impl Resolve for SsrfSafeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let allowlist = Arc::clone(&self.allowlist);
        let hostname = name.as_str().to_string();

        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(format!("{hostname}:0"))
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let permitted: Vec<SocketAddr> = addrs
                .into_iter()
                .filter(|addr| {
                    let ip = addr.ip();
                    if !SsrfSafeResolver::is_private(&ip) {
                        return true;
                    }
                    if allowlist.contains(&ip) {
                        info!(ip = %ip, host = %hostname, "allowing configured private IP");
                        true
                    } else {
                        error!(ip = %ip, host = %hostname, "SSRF blocked: resolved to private IP");
                        false
                    }
                })
                .collect();

            if permitted.is_empty() {
                let err: Box<dyn std::error::Error + Send + Sync> =
                    format!("SSRF blocked: {hostname} resolves only to private IPs").into();
                return Err(err);
            }

            let addrs: Addrs = Box::new(permitted.into_iter());
            Ok(addrs)
        })
    }
}

/// Convenience wrapper over [`SsrfSafeResolver::is_private`].
pub fn is_private_ip(ip: &IpAddr) -> bool {
    SsrfSafeResolver::is_private(ip)
}

/// Rejects URLs whose host is a literal private IP not on the allowlist.
///
/// Hostnames pass here; the resolver checks them at connect time.
pub fn validate_url_host(url: &str, allowlist: &PrivateAllowlist) -> Result<(), ReelgrabError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| ReelgrabError::InvalidUrl(format!("{url}: {e}")))?;
    check_host(&parsed, allowlist)
}

/// Literal-IP check on an already parsed URL.
pub fn check_host(url: &url::Url, allowlist: &PrivateAllowlist) -> Result<(), ReelgrabError> {
    let ip = match url.host() {
        Some(url::Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(url::Host::Ipv6(v6)) => IpAddr::V6(v6),
        Some(url::Host::Domain(_)) => return Ok(()),
        None => {
            return Err(ReelgrabError::InvalidUrl(format!("{url}: missing host")));
        }
    };

    if SsrfSafeResolver::is_private(&ip) && !allowlist.contains(&ip) {
        error!(ip = %ip, url = %url, "SSRF blocked: URL targets private IP");
        return Err(ReelgrabError::Security(format!(
            "SSRF blocked: URL targets private IP {ip}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn blocks_rfc1918_ranges() {
        assert!(SsrfSafeResolver::is_private(&v4(10, 0, 0, 1)));
        assert!(SsrfSafeResolver::is_private(&v4(172, 16, 0, 1)));
        assert!(SsrfSafeResolver::is_private(&v4(172, 31, 255, 255)));
        assert!(SsrfSafeResolver::is_private(&v4(192, 168, 1, 1)));
    }

    #[test]
    fn blocks_loopback_and_link_local_v4() {
        assert!(SsrfSafeResolver::is_private(&v4(127, 0, 0, 1)));
        assert!(SsrfSafeResolver::is_private(&v4(127, 255, 255, 255)));
        assert!(SsrfSafeResolver::is_private(&v4(169, 254, 1, 1)));
        assert!(SsrfSafeResolver::is_private(&v4(169, 254, 169, 254)));
    }

    #[test]
    fn blocks_special_v4() {
        assert!(SsrfSafeResolver::is_private(&v4(0, 0, 0, 0)));
        assert!(SsrfSafeResolver::is_private(&v4(255, 255, 255, 255)));
        assert!(SsrfSafeResolver::is_private(&v4(100, 64, 0, 1)));
        assert!(!SsrfSafeResolver::is_private(&v4(100, 128, 0, 1)));
    }

    #[test]
    fn blocks_private_v6() {
        assert!(SsrfSafeResolver::is_private(&IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert!(SsrfSafeResolver::is_private(&IpAddr::V6(Ipv6Addr::UNSPECIFIED)));
        let ula = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 1);
        assert!(SsrfSafeResolver::is_private(&IpAddr::V6(ula)));
        let link_local = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        assert!(SsrfSafeResolver::is_private(&IpAddr::V6(link_local)));
    }

    #[test]
    fn blocks_v4_mapped_v6() {
        let mapped = Ipv4Addr::new(10, 1, 2, 3).to_ipv6_mapped();
        assert!(SsrfSafeResolver::is_private(&IpAddr::V6(mapped)));
    }

    #[test]
    fn allows_public_addresses() {
        assert!(!SsrfSafeResolver::is_private(&v4(8, 8, 8, 8)));
        assert!(!SsrfSafeResolver::is_private(&v4(151, 101, 0, 84)));
        let google = Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888);
        assert!(!SsrfSafeResolver::is_private(&IpAddr::V6(google)));
    }

    #[test]
    fn allowlist_skips_garbage_entries() {
        let allowlist = PrivateAllowlist::new(&[
            "127.0.0.1".to_string(),
            "::1".to_string(),
            "localhost".to_string(),
        ]);
        assert_eq!(allowlist.len(), 2);
    }

    #[test]
    fn url_check_blocks_private_literal() {
        let none = PrivateAllowlist::default();
        assert!(validate_url_host("http://10.0.0.1:8080/api", &none).is_err());
        assert!(validate_url_host("http://127.0.0.1/internal", &none).is_err());
        assert!(validate_url_host("http://[::1]:3000/", &none).is_err());
    }

    #[test]
    fn url_check_honours_allowlist() {
        let allowlist = PrivateAllowlist::new(&["127.0.0.1".to_string()]);
        assert!(validate_url_host("http://127.0.0.1:4000/pin.jpg", &allowlist).is_ok());
        assert!(validate_url_host("http://127.0.0.2:4000/pin.jpg", &allowlist).is_err());
    }

    #[test]
    fn url_check_passes_public_hosts() {
        let none = PrivateAllowlist::default();
        assert!(validate_url_host("https://i.pinimg.com/originals/a.jpg", &none).is_ok());
        assert!(validate_url_host("https://1.1.1.1/", &none).is_ok());
    }

    #[test]
    fn url_check_rejects_garbage() {
        let err = validate_url_host("not a url", &PrivateAllowlist::default()).unwrap_err();
        assert!(matches!(err, ReelgrabError::InvalidUrl(_)));
    }
}
