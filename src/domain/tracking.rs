//! Normalized tracking vocabulary and event history.
//!
//! Every provider's status codes are mapped into `TrackingStatus`; the
//! storefront never sees a raw provider status. Event history is
//! append-only and `TrackingState::status` always equals the status of the
//! most recent event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared status vocabulary across all carriers and suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    Booked,
    InPreparation,
    Shipped,
    InTransit,
    Customs,
    Delivered,
    Exception,
    Cancelled,
}

impl std::fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Booked => "booked",
            Self::InPreparation => "in_preparation",
            Self::Shipped => "shipped",
            Self::InTransit => "in_transit",
            Self::Customs => "customs",
            Self::Delivered => "delivered",
            Self::Exception => "exception",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// A single tracking event reported by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: TrackingStatus,
    #[serde(default)]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Current tracking state plus its full event history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingState {
    pub status: TrackingStatus,
    #[serde(default)]
    pub location: Option<String>,
    pub last_event_at: DateTime<Utc>,
    pub events: Vec<TrackingEvent>,
}

impl TrackingState {
    /// Build a state from a non-empty, chronologically ordered event list.
    ///
    /// Events are sorted by timestamp to enforce ordering even when a
    /// provider returns them newest-first. Returns `None` for an empty list.
    pub fn from_events(mut events: Vec<TrackingEvent>) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        events.sort_by_key(|e| e.timestamp);
        let last = events.last().expect("non-empty after check");
        Some(Self {
            status: last.status,
            location: last.location.clone(),
            last_event_at: last.timestamp,
            events,
        })
    }

    /// Append a newer event, keeping `status` in sync with the history.
    ///
    /// Events older than the current head are inserted in order but do not
    /// change the headline status.
    pub fn push_event(&mut self, event: TrackingEvent) {
        if event.timestamp >= self.last_event_at {
            self.status = event.status;
            self.location = event.location.clone();
            self.last_event_at = event.timestamp;
        }
        self.events.push(event);
        self.events.sort_by_key(|e| e.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(status: TrackingStatus, hour: u32) -> TrackingEvent {
        TrackingEvent {
            status,
            location: Some("Rotterdam".to_string()),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap(),
            description: format!("status {status}"),
        }
    }

    #[test]
    fn from_events_orders_and_takes_latest_status() {
        let state = TrackingState::from_events(vec![
            event(TrackingStatus::InTransit, 12),
            event(TrackingStatus::Booked, 8),
        ])
        .unwrap();
        assert_eq!(state.status, TrackingStatus::InTransit);
        assert_eq!(state.events.len(), 2);
        assert_eq!(state.events[0].status, TrackingStatus::Booked);
    }

    #[test]
    fn from_events_rejects_empty_history() {
        assert!(TrackingState::from_events(Vec::new()).is_none());
    }

    #[test]
    fn push_event_keeps_status_matching_newest_event() {
        let mut state =
            TrackingState::from_events(vec![event(TrackingStatus::Shipped, 9)]).unwrap();
        state.push_event(event(TrackingStatus::Customs, 14));
        assert_eq!(state.status, TrackingStatus::Customs);

        // A late-arriving older event is kept but never rewinds the status.
        state.push_event(event(TrackingStatus::Booked, 7));
        assert_eq!(state.status, TrackingStatus::Customs);
        assert_eq!(state.events.len(), 3);
        assert_eq!(state.events[0].status, TrackingStatus::Booked);
    }
}
