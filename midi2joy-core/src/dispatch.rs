//! Multi-producer event queue feeding a single router
//!
//! Every input port pushes into the same channel; one task drains it, so all
//! device writes are serialized without a lock around the output device.

use crate::device::OutputDevice;
use crate::error::RouteError;
use crate::router::{EventRouter, InputEvent};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::info;

pub type EventSender = mpsc::UnboundedSender<InputEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<InputEvent>;

/// Create the queue between input ports and the router
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Counters collected while draining the queue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    /// Events that produced a device write
    pub routed: u64,
    /// Unmapped events
    pub ignored: u64,
    /// Out-of-range values, or events before startup
    pub rejected: u64,
    /// Device writes that failed
    pub failed: u64,
}

impl RouterStats {
    pub fn total(&self) -> u64 {
        self.routed + self.ignored + self.rejected + self.failed
    }

    fn record(&mut self, outcome: &Result<Option<crate::router::OutputCommand>, RouteError>) {
        match outcome {
            Ok(Some(_)) => self.routed += 1,
            Ok(None) => self.ignored += 1,
            Err(RouteError::Output { .. }) => self.failed += 1,
            Err(RouteError::NotRunning | RouteError::ValueOutOfRange { .. }) => self.rejected += 1,
        }
    }
}

/// Route events until every sender is dropped or `shutdown` resolves.
pub async fn run_router<D, F>(
    router: &mut EventRouter<D>,
    events: &mut EventReceiver,
    shutdown: F,
) -> RouterStats
where
    D: OutputDevice,
    F: Future<Output = ()>,
{
    let mut stats = RouterStats::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    info!("All input sources closed");
                    break;
                };
                let outcome = router.route(event);
                stats.record(&outcome);
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    stats
}
