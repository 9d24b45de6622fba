use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use url::Host;

use crate::error::ScanError;

/// Maps a target (IPv4 literal or domain) to the IPv4 address that gets scanned.
pub fn lookup(target: &str) -> Result<Ipv4Addr, ScanError> {
    let ip = match Host::parse(target.trim()).map_err(ScanError::HostParseFailed)? {
        Host::Domain(dmn) => first_ipv4(&dmn)?.ok_or(ScanError::DomainLookupFailed(target.into()))?,
        Host::Ipv4(ip) => ip,
        Host::Ipv6(_) => Err(ScanError::OnlyIpv4TargetSupported)?,
    };

    log::debug!("Target `{}` resolved to `{}`", target, ip);

    Ok(ip)
}

fn first_ipv4(domain: &str) -> Result<Option<Ipv4Addr>, ScanError> {
    let found = (domain, 0 /* dummy port */)
        .to_socket_addrs()
        .map_err(ScanError::ResolverFailed)?
        .find_map(|saddr| match saddr {
            SocketAddr::V4(sip) => Some(*sip.ip()),
            SocketAddr::V6(_) => None,
        });

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_literal_is_used_as_is() {
        assert_eq!(lookup("10.1.2.3").unwrap(), Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(lookup(" 127.0.0.1 ").unwrap(), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn localhost_resolves_to_ipv4() {
        assert!(lookup("localhost").unwrap().is_loopback());
    }

    #[test]
    fn ipv6_literal_is_rejected() {
        assert!(matches!(
            lookup("[::1]"),
            Err(ScanError::OnlyIpv4TargetSupported)
        ));
    }

    #[test]
    fn garbage_target_is_rejected() {
        assert!(lookup("").is_err());
        assert!(lookup("no-such-host.invalid").is_err());
    }
}
