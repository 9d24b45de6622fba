use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use super::probe::ProbeOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
}

impl Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PortState::Open => "OPEN",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPortRecord {
    pub port: u16,
    pub state: PortState,
    pub service: String,
}

impl OpenPortRecord {
    pub fn new(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            state: PortState::Open,
            service: service.into(),
        }
    }
}

/// Open ports gathered by all workers of a scan.
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Mutex<Vec<OpenPortRecord>>,
    probed: AtomicUsize,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking appender can't leave a half-written record behind.
    fn records(&self) -> MutexGuard<'_, Vec<OpenPortRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, record: OpenPortRecord) {
        self.records().push(record);
    }

    /// Accounts for a finished probe, keeping it only when the port is open.
    pub fn record(&self, port: u16, outcome: ProbeOutcome) {
        // Counted first so a snapshot never holds more records than probes.
        self.probed.fetch_add(1, Ordering::AcqRel);
        if let ProbeOutcome::Open { service } = outcome {
            self.append(OpenPortRecord::new(port, service));
        }
    }

    /// Probes completed so far.
    #[inline]
    pub fn probed(&self) -> usize {
        self.probed.load(Ordering::Acquire)
    }

    /// Snapshot of the records so far, ascending by port.
    pub fn finalize(&self) -> Vec<OpenPortRecord> {
        let mut ports = self.records().clone();
        ports.sort_unstable_by_key(|r| r.port);
        ports
    }
}
