use std::sync::atomic::{AtomicU32, Ordering};

use crate::port::PortRange;

/// Shared supply of ports still waiting to be probed.
///
/// Every port of the range is handed out exactly once, no matter how many
/// workers pull concurrently. Once drained it stays drained.
#[derive(Debug)]
pub struct PortQueue {
    next: AtomicU32,
    end: u32,
}

impl PortQueue {
    pub fn new(range: PortRange) -> Self {
        Self {
            next: AtomicU32::new(range.start() as u32),
            end: range.end() as u32,
        }
    }

    /// Claims the next pending port, `None` once every port was served.
    pub fn next_port(&self) -> Option<u16> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next <= self.end).then_some(next + 1)
            })
            .ok()
            .map(|port| port as u16)
    }

    /// Ports not yet claimed.
    pub fn remaining(&self) -> usize {
        let next = self.next.load(Ordering::Acquire);
        (self.end + 1).saturating_sub(next) as usize
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc, thread};

    use super::*;

    #[test]
    fn serves_range_in_order_then_drains() {
        let queue = PortQueue::new(PortRange::new(65533, 65535).unwrap());
        assert_eq!(queue.remaining(), 3);
        assert_eq!(queue.next_port(), Some(65533));
        assert_eq!(queue.next_port(), Some(65534));
        assert_eq!(queue.next_port(), Some(65535));
        assert_eq!(queue.remaining(), 0);

        for _ in 0..10 {
            assert_eq!(queue.next_port(), None);
        }
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn concurrent_consumers_never_share_a_port() {
        let range = PortRange::new(1, 20_000).unwrap();
        let queue = Arc::new(PortQueue::new(range));

        let handles = (0..16)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut claimed = Vec::new();
                    while let Some(port) = queue.next_port() {
                        claimed.push(port);
                    }
                    claimed
                })
            })
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        let mut total = 0;
        for handle in handles {
            for port in handle.join().unwrap() {
                assert!(seen.insert(port), "port {} served twice", port);
                total += 1;
            }
        }

        assert_eq!(total, range.len());
        assert!(range.iter().all(|p| seen.contains(&p)));
        assert_eq!(queue.next_port(), None);
    }
}
