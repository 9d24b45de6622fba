use std::{
    fmt::Debug,
    net::{SocketAddr, SocketAddrV4, TcpStream},
    sync::Arc,
    time::Duration,
};

use super::service::{ServiceNames, SystemServices};

/// Upper bound of a single connection attempt.
pub const TIMEOUT: Duration = Duration::from_secs(1);

/// Classification of one connection attempt.
///
/// Refused, timed out and any other socket fault all end up as `NotOpen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open { service: String },
    NotOpen,
}

pub trait Probe: Debug + Send + Sync {
    fn probe(&self, addr: &SocketAddrV4) -> ProbeOutcome;
}

/// Full TCP connect probe.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
    services: Arc<dyn ServiceNames>,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self {
            timeout: TIMEOUT,
            services: Arc::new(SystemServices),
        }
    }
}

impl TcpProbe {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_services(mut self, services: impl ServiceNames + 'static) -> Self {
        self.services = Arc::new(services);
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Probe for TcpProbe {
    fn probe(&self, addr: &SocketAddrV4) -> ProbeOutcome {
        // The stream is dropped, and the socket closed, before the name lookup.
        let connected = TcpStream::connect_timeout(&SocketAddr::V4(*addr), self.timeout).is_ok();

        if !connected {
            return ProbeOutcome::NotOpen;
        }

        ProbeOutcome::Open {
            service: self.services.name_or_unknown(addr.port()),
        }
    }
}
