//! Broadcast-backed event bus bridging the delegator to WebSocket clients.

use cadre_rs_protocol::{EventMsg, EventSink};
use log::debug;
use tokio::sync::broadcast;

/// Broadcast-backed event bus for finalized interaction events.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<EventMsg>,
}

impl EventBus {
    /// Create a new event bus with the given channel buffer size.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer);
        debug!("event bus initialized (buffer={})", buffer);
        Self { sender }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<EventMsg> {
        self.sender.subscribe()
    }
}

impl EventSink for EventBus {
    /// Emit an event into the broadcast channel.
    ///
    /// Delivery is best effort: with no subscribers the event is dropped.
    fn emit(&self, event: EventMsg) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use cadre_rs_protocol::{EventMsg, EventPayload, EventSink, InteractionRecord};

    #[tokio::test]
    async fn event_bus_delivers_to_subscribers() {
        let bus = EventBus::new(8);
        let mut receiver = bus.subscribe();

        let record = InteractionRecord::new("hello".to_string());
        let event = EventMsg::new(
            record.id,
            EventPayload::InteractionFinished {
                record: record.clone(),
            },
        );
        bus.emit(event.clone());

        let received = receiver.recv().await.expect("recv");
        assert_eq!(received.id, event.id);
        assert_eq!(received.interaction_id, record.id);
    }

    #[test]
    fn event_bus_tolerates_no_subscribers() {
        let bus = EventBus::new(8);
        let record = InteractionRecord::new("nobody listening".to_string());
        bus.emit(EventMsg::new(
            record.id,
            EventPayload::InteractionFinished { record },
        ));
    }
}
