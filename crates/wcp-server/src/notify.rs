//! Bridge from the synchronous core event bus to the transport's broadcast
//! channel.

use tokio::sync::broadcast;
use tracing::trace;
use wcp_protocol::notifications::from_event;
use wcp_vfs::{EventBus, Subscription};

/// Forward every bus event to `tx` as a serialized notification.
///
/// The handler runs inside `publish`, under the registry lock, so
/// notifications enter the channel in mutation order.
pub fn bridge_events(bus: &EventBus, tx: broadcast::Sender<String>) -> Subscription {
    bus.subscribe_all(move |event| {
        let notification = from_event(event);
        trace!("Notify {}", notification.method);
        // No receivers is fine.
        let _ = tx.send(notification.to_json());
    })
}
