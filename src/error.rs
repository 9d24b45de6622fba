use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("port range `{0}` is invalid (expected `start-end` or a single port in 1-65535)")]
    InvalidPortRange(String),
    #[error("worker count `{0}` is invalid (expected a positive integer)")]
    InvalidWorkerCount(String),
    #[error("failed to check target kind (ensure it's a domain or IPv4)")]
    HostParseFailed(#[source] url::ParseError),
    #[error("failed to resolve the given target: {0}")]
    ResolverFailed(#[source] std::io::Error),
    #[error("resolver didn't find any IPv4 address mapped by `{0}`")]
    DomainLookupFailed(String),
    #[error("only supports IPv4 addresses or domains that map addresses with this IP version")]
    OnlyIpv4TargetSupported,
    #[error("failed to start scan workers: {0}")]
    WorkerPoolFailed(#[source] rayon::ThreadPoolBuildError),
    #[error("failed to install interrupt handler: {0}")]
    SignalHandlerFailed(#[source] std::io::Error),
    #[error("failed to write results to `{}`: {}", .0.display(), .1)]
    OutputWriteFailed(PathBuf, #[source] std::io::Error),
}
