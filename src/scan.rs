use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError},
        Arc,
    },
    time::{Duration, Instant},
};

use rayon::ThreadPoolBuilder;

use crate::{error::ScanError, port::PortRange};

pub use self::{
    collector::{OpenPortRecord, PortState, ResultCollector},
    probe::{Probe, ProbeOutcome, TcpProbe, TIMEOUT},
    queue::PortQueue,
    service::{ServiceNames, ServiceTable, SystemServices, UNKNOWN_SERVICE},
};

mod collector;
mod probe;
mod queue;
mod service;

/// Default upper bound of concurrently running workers.
pub const MAX_WORKERS: usize = 100;

// How often the coordinator looks at the stop flag while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct ScanResult {
    pub elapsed: Duration,
    /// Open ports, ascending.
    pub ports: Vec<OpenPortRecord>,
    /// Probes finished when the result was taken.
    pub probed: usize,
    pub total: usize,
    /// Whether waiting was cut short by the stop flag.
    pub interrupted: bool,
}

/// One scan of a port range on a single target.
#[derive(Debug)]
pub struct Scanner {
    ip: Ipv4Addr,
    range: PortRange,
    max_workers: usize,
    probe: Arc<dyn Probe>,
}

impl Scanner {
    pub fn new(ip: Ipv4Addr, range: PortRange) -> Self {
        Self {
            ip,
            range,
            max_workers: MAX_WORKERS,
            probe: Arc::new(TcpProbe::default()),
        }
    }

    pub fn max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    pub fn probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Never more workers than ports to scan.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.max_workers.min(self.range.len())
    }

    #[inline]
    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Runs the scan and blocks until every port was probed or `stop` is raised.
    ///
    /// On stop the wait is abandoned right away and whatever was collected so far
    /// is returned. Workers still probing are not cancelled; they finish within
    /// the probe timeout and their results are discarded.
    pub fn start(&self, stop: &AtomicBool) -> Result<ScanResult, ScanError> {
        let workers = self.worker_count();
        let tasks = Arc::new(PortQueue::new(self.range));
        let results = Arc::new(ResultCollector::new());

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|id| format!("scan-worker-{}", id))
            .build()
            .map_err(ScanError::WorkerPoolFailed)?;

        log::debug!(
            "Scanning {} ports of `{}` with {} workers",
            self.range.len(),
            self.ip,
            workers
        );

        let now = Instant::now();

        // Workers hold a sender each; the channel disconnects once the last one exits.
        let (done_tx, done_rx) = mpsc::channel::<()>();
        for id in 0..workers {
            let done = done_tx.clone();
            let tasks = Arc::clone(&tasks);
            let results = Arc::clone(&results);
            let probe = Arc::clone(&self.probe);
            let ip = self.ip;

            pool.spawn(move || {
                let probed = work(ip, probe.as_ref(), &tasks, &results);
                log::debug!("Worker {} finished after {} probes", id, probed);
                drop(done);
            });
        }
        drop(done_tx);

        let interrupted = wait(&done_rx, stop);
        if interrupted {
            log::debug!(
                "Stopped waiting with {} ports still unclaimed",
                tasks.remaining()
            );
        }

        Ok(ScanResult {
            elapsed: now.elapsed(),
            ports: results.finalize(),
            probed: results.probed(),
            total: self.range.len(),
            interrupted,
        })
    }
}

fn work(ip: Ipv4Addr, probe: &dyn Probe, tasks: &PortQueue, results: &ResultCollector) -> usize {
    let mut probed = 0;
    while let Some(port) = tasks.next_port() {
        let outcome = probe.probe(&SocketAddrV4::new(ip, port));
        results.record(port, outcome);
        probed += 1;
    }
    probed
}

/// Returns `true` when `stop` ended the wait before all workers exited.
fn wait(done: &Receiver<()>, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::SeqCst) {
            return true;
        }

        match done.recv_timeout(POLL_INTERVAL) {
            Err(RecvTimeoutError::Disconnected) => return false,
            Ok(()) | Err(RecvTimeoutError::Timeout) => continue,
        }
    }
}
