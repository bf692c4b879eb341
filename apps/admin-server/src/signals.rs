//! # Order Signals
//!
//! In-process notification fired once per successfully created order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        order_created Signal                             │
//! │                                                                         │
//! │  POST /admin/store/order/                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRepository::create ── commit ──► OrderSignals::send(order)       │
//! │                                              │                          │
//! │                                  broadcast::channel(capacity)           │
//! │                                   │          │            │             │
//! │                                   ▼          ▼            ▼             │
//! │                              print_order   tests      other handlers   │
//! │                              (stdout)                                   │
//! │                                                                         │
//! │  A failed or rolled-back create never reaches send().                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::{self, Write};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use storefront_core::OrderWithItems;

/// Payload of the order-created signal: the committed order with its items.
#[derive(Debug, Clone)]
pub struct OrderCreated {
    pub order: OrderWithItems,
}

/// Sender side of the order-created signal.
#[derive(Debug, Clone)]
pub struct OrderSignals {
    tx: broadcast::Sender<OrderCreated>,
}

impl OrderSignals {
    /// Creates the signal; `capacity` events are buffered per receiver.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        OrderSignals { tx }
    }

    /// Fires the signal.
    ///
    /// ## Returns
    /// Number of receivers the event was delivered to (0 when nobody listens).
    pub fn send(&self, order: OrderWithItems) -> usize {
        let order_id = order.order.id.clone();
        match self.tx.send(OrderCreated { order }) {
            Ok(receivers) => {
                debug!(order_id = %order_id, receivers, "order_created sent");
                receivers
            }
            Err(_) => {
                debug!(order_id = %order_id, "order_created sent with no receivers");
                0
            }
        }
    }

    /// New receiver that sees every event sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderCreated> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Runs `handler` for each event on a background task.
    ///
    /// The task ends once every sender is dropped.
    pub fn connect<F>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(OrderCreated) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "order_created receiver lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Writes the order's text representation on its own line.
pub fn on_order_created<W: Write>(event: &OrderCreated, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", event.order)?;
    out.flush()
}

/// Default handler: prints the created order to stdout.
pub fn print_order(event: OrderCreated) {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    if let Err(e) = on_order_created(&event, &mut lock) {
        warn!(order_id = %event.order.order.id, error = %e, "Failed to print created order");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
