//! Shared types and error enum for flightwatch-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by flightwatch.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("flight provider error: {0}")]
    Provider(String),
    #[error("delivery to {destination} failed: {reason}")]
    Delivery { destination: String, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;

// ---------------------------------------------------------------------------
// Snapshot input
// ---------------------------------------------------------------------------

/// One flight reported by the data provider inside the watched region.
///
/// Created fresh every poll cycle and discarded after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedFlight {
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    pub transponder_code: String,
}

impl ObservedFlight {
    pub fn new(callsign: &str, latitude: f64, longitude: f64, transponder_code: &str) -> Self {
        ObservedFlight {
            callsign: callsign.to_string(),
            latitude,
            longitude,
            transponder_code: transponder_code.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alert output
// ---------------------------------------------------------------------------

/// Which state transition produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Entered,
    Left,
    TransponderChanged,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Entered => "entered",
            AlertKind::Left => "left",
            AlertKind::TransponderChanged => "transponder_changed",
        }
    }
}

/// An alert produced by reconciliation, delivered once to every destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub callsign: String,
    pub message: String,
}

impl AlertEvent {
    pub fn entered(callsign: &str, latitude: f64, longitude: f64) -> Self {
        AlertEvent {
            kind: AlertKind::Entered,
            callsign: callsign.to_string(),
            message: format!("{callsign} has entered the region: [{latitude}, {longitude}]"),
        }
    }

    pub fn left(callsign: &str) -> Self {
        AlertEvent {
            kind: AlertKind::Left,
            callsign: callsign.to_string(),
            message: format!("{callsign} has left the region"),
        }
    }

    pub fn transponder_changed(callsign: &str, code: &str) -> Self {
        AlertEvent {
            kind: AlertKind::TransponderChanged,
            callsign: callsign.to_string(),
            message: format!("ALERT! New transponder code for {callsign}: {code}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entered_message() {
        let ev = AlertEvent::entered("FORTE10", 10.0, 20.0);
        assert_eq!(ev.kind, AlertKind::Entered);
        assert_eq!(ev.message, "FORTE10 has entered the region: [10, 20]");
    }

    #[test]
    fn test_entered_message_fractional_coords() {
        let ev = AlertEvent::entered("FORTE10", 43.5333, 33.2457);
        assert_eq!(
            ev.message,
            "FORTE10 has entered the region: [43.5333, 33.2457]"
        );
    }

    #[test]
    fn test_left_message() {
        assert_eq!(
            AlertEvent::left("FORTE10").message,
            "FORTE10 has left the region"
        );
    }

    #[test]
    fn test_transponder_message() {
        let ev = AlertEvent::transponder_changed("FORTE10", "7700");
        assert_eq!(ev.kind, AlertKind::TransponderChanged);
        assert_eq!(ev.message, "ALERT! New transponder code for FORTE10: 7700");
    }

    #[test]
    fn test_error_display() {
        let err = WatchError::Delivery {
            destination: "https://example.com/hook".into(),
            reason: "HTTP 500".into(),
        };
        assert_eq!(
            err.to_string(),
            "delivery to https://example.com/hook failed: HTTP 500"
        );
    }
}
