use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use stockpilot_events::{AlertNotice, EventBus, InMemoryEventBus, LOW_STOCK_TOPIC};
use stockpilot_infra::{
    InMemoryAlertStore, InMemoryItemLedger, InMemoryMovementStore, MutationPipeline,
};

/// Pipeline wired to the in-memory backends.
pub type InMemoryPipeline = MutationPipeline<
    Arc<InMemoryItemLedger>,
    Arc<InMemoryMovementStore>,
    Arc<InMemoryAlertStore>,
    Arc<InMemoryEventBus<AlertNotice>>,
>;

/// Service state shared by all handlers.
pub struct AppServices {
    pipeline: InMemoryPipeline,
    realtime_tx: broadcast::Sender<AlertNotice>,
}

impl AppServices {
    pub fn pipeline(&self) -> &InMemoryPipeline {
        &self.pipeline
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<AlertNotice> {
        &self.realtime_tx
    }
}

pub fn build_services() -> AppServices {
    let ledger = Arc::new(InMemoryItemLedger::new());
    let movements = Arc::new(InMemoryMovementStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    let bus: Arc<InMemoryEventBus<AlertNotice>> = Arc::new(InMemoryEventBus::new());

    // Realtime channel (SSE): lossy broadcast; slow dashboards drop notices
    // rather than applying backpressure to the mutation path.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<AlertNotice>(256);

    // Background bridge: notice bus -> SSE broadcast.
    {
        let sub = bus.subscribe();
        let realtime_tx = realtime_tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match sub.recv() {
                Ok(notice) => {
                    let _ = realtime_tx.send(notice);
                }
                Err(_) => break,
            }
        });
    }

    let pipeline = MutationPipeline::new(ledger, movements, alerts, bus);

    AppServices {
        pipeline,
        realtime_tx,
    }
}

/// Build the SSE stream of low-stock notices (used by `/stream`).
pub fn alert_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(notice) => {
            let data = serde_json::to_string(&notice).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(LOW_STOCK_TOPIC).data(data)))
        }
        // A lagged receiver skips what it missed; state is re-derivable by
        // pulling the alerts endpoint.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
