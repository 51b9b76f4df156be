use serde::{Deserialize, Serialize};

use channel_core::{CompanyId, MoveId};

use crate::event::Event;

/// Envelope for a recorded event, carrying stream metadata.
///
/// This is the unit an audit store keeps per company stream.
///
/// Notes:
/// - `stream_id` is the company the event is about (for moves: the customer).
/// - **Append-only**: `sequence_number` starts at 1 and increases by one per
///   append to the same stream, so ordering never depends on clock resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<E> {
    event_id: MoveId,
    stream_id: CompanyId,
    sequence_number: u64,
    event_type: String,
    event_version: u32,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap `payload` as the `sequence_number`-th event of `stream_id`.
    pub fn record(stream_id: CompanyId, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id: MoveId::new(),
            stream_id,
            sequence_number,
            event_type: payload.event_type().to_string(),
            event_version: payload.version(),
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> MoveId {
        self.event_id
    }

    pub fn stream_id(&self) -> CompanyId {
        self.stream_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Schema version of the payload at the time it was recorded.
    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Pinged {
        at: DateTime<Utc>,
    }

    impl Event for Pinged {
        fn event_type(&self) -> &'static str {
            "test.pinged"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn record_copies_event_type_and_stream_metadata() {
        let at = Utc.with_ymd_and_hms(2026, 2, 10, 11, 22, 0).unwrap();
        let envelope = EventEnvelope::record(CompanyId::new(6), 3, Pinged { at });

        assert_eq!(envelope.stream_id(), CompanyId::new(6));
        assert_eq!(envelope.sequence_number(), 3);
        assert_eq!(envelope.event_type(), "test.pinged");
        assert_eq!(envelope.event_version(), 1);
        assert_eq!(envelope.payload().occurred_at(), at);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let at = Utc.with_ymd_and_hms(2026, 2, 10, 11, 22, 0).unwrap();
        let envelope = EventEnvelope::record(CompanyId::new(6), 1, Pinged { at });
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["streamId"], 6);
        assert_eq!(json["sequenceNumber"], 1);
        assert_eq!(json["eventType"], "test.pinged");
        assert_eq!(json["eventVersion"], 1);
    }
}
