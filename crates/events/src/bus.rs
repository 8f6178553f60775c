//! Publish/subscribe abstraction for real-time notices (mechanics only).
//!
//! The bus is the hand-off point between the mutation pipeline and whatever is
//! listening (SSE bridges, dashboards, tests). It makes minimal assumptions:
//!
//! - **Transport-agnostic**: works with in-memory channels or an external broker
//! - **Best-effort**: delivery is not durable; a subscriber connected after
//!   publication simply misses the notice
//! - **Broadcast semantics**: each subscriber gets its own copy
//!
//! The authoritative alert state always lives in storage and is re-derivable
//! via a pull query, so lost notices are acceptable. Publishing happens after
//! persistence and must never block or fail the enclosing mutation; the
//! pipeline logs and swallows publish errors.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

/// A subscription to a notice stream.
///
/// Designed for single-threaded consumption; forward through a channel if
/// multiple consumers need the same subscription.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic notice bus (pub/sub abstraction).
///
/// `publish()` may fail (lock poisoning, broker outage); callers on the
/// mutation path treat that as a log-and-continue condition, never as a
/// request failure.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
