//! The bounded intake buffer.
//!
//! A FIFO queue with a non-blocking `offer` (accept, or reject with an
//! explicit overload signal) and a suspending `take` (wait for an item or
//! for the buffer to close and drain). Depth is tracked separately from the
//! queue length so readers never need to touch the queue lock for a
//! best-effort occupancy read.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// An opaque log packet: an identifier used only for logging/tracing, and a
/// body handed verbatim to the transport adapter.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Identifier used for logging/tracing only; never interpreted.
    pub id: String,
    /// Opaque payload handed verbatim to the transport adapter.
    pub body: Vec<u8>,
}

impl Packet {
    /// Builds a packet from an id and body.
    pub fn new(id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { id: id.into(), body: body.into() }
    }
}

/// Result of [`IntakeBuffer::offer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The packet was enqueued.
    Accepted,
    /// The buffer was full; the packet was not enqueued.
    Overloaded,
    /// The buffer is closed; the packet was not enqueued.
    Closed,
}

/// Result of [`IntakeBuffer::take`].
#[derive(Debug)]
pub enum TakeOutcome {
    /// A packet was dequeued.
    Packet(Packet),
    /// The buffer is closed and has been fully drained.
    Closed,
}

struct Inner {
    queue: Mutex<VecDeque<Packet>>,
    capacity: usize,
    depth: AtomicUsize,
    closed: AtomicBool,
    not_empty_or_closed: Notify,
}

/// A bounded, multi-producer multi-consumer FIFO queue of packets.
///
/// Cheap to clone (an `Arc` handle); every worker and the engine's `submit`
/// path shares the same underlying queue.
#[derive(Clone)]
pub struct IntakeBuffer {
    inner: Arc<Inner>,
}

impl IntakeBuffer {
    /// Creates an empty buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity,
                depth: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                not_empty_or_closed: Notify::new(),
            }),
        }
    }

    /// Offers `packet` to the buffer. Never waits: returns immediately with
    /// [`OfferOutcome::Overloaded`] if the buffer is at capacity, or
    /// [`OfferOutcome::Closed`] if the buffer has been closed.
    pub async fn offer(&self, packet: Packet) -> OfferOutcome {
        if self.inner.closed.load(Ordering::Acquire) {
            return OfferOutcome::Closed;
        }
        let mut queue = self.inner.queue.lock().await;
        if self.inner.closed.load(Ordering::Acquire) {
            return OfferOutcome::Closed;
        }
        if queue.len() >= self.inner.capacity {
            return OfferOutcome::Overloaded;
        }
        queue.push_back(packet);
        drop(queue);
        self.inner.depth.fetch_add(1, Ordering::AcqRel);
        self.inner.not_empty_or_closed.notify_one();
        OfferOutcome::Accepted
    }

    /// Takes the next packet in FIFO order, suspending until one is
    /// available or the buffer is closed and empty.
    pub async fn take(&self) -> TakeOutcome {
        loop {
            // Register for a notification before checking state: `Notify`
            // stores no permit for `notify_waiters`, so a `close()` landing
            // between the check below and an `await` registered afterward
            // would be missed and this task would suspend forever. Building
            // the `Notified` future first means it observes any
            // `notify_waiters` call that happens from this point on, even
            // one that completes before we actually `.await` it.
            let notified = self.inner.not_empty_or_closed.notified();

            {
                let mut queue = self.inner.queue.lock().await;
                if let Some(packet) = queue.pop_front() {
                    drop(queue);
                    self.inner.depth.fetch_sub(1, Ordering::AcqRel);
                    return TakeOutcome::Packet(packet);
                }
                if self.inner.closed.load(Ordering::Acquire) {
                    return TakeOutcome::Closed;
                }
            }

            notified.await;
        }
    }

    /// Marks the buffer closed. Further `offer` calls fail with
    /// [`OfferOutcome::Closed`]; workers already waiting in `take` drain the
    /// remaining queue, then observe [`TakeOutcome::Closed`].
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.not_empty_or_closed.notify_waiters();
    }

    /// Best-effort current occupancy, in `[0, capacity]`.
    pub fn depth(&self) -> usize {
        self.inner.depth.load(Ordering::Acquire)
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Whether the buffer has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}
