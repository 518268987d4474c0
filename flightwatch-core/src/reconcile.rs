//! Snapshot reconciliation — the per-flight presence state machine.
//!
//! Pure logic — no I/O. Given the store and a fresh snapshot of flights in
//! the region, flips each tracked entity between absent and present, records
//! transponder code changes, and returns the alerts the caller should deliver.
//!
//! Per entity:
//!
//! ```text
//! Absent  --match-->     Present   (entered)
//! Present --no match-->  Absent    (left)
//! Present --match-->     Present   (nothing)
//! ```
//!
//! A transponder code change is checked whenever a match exists and fires
//! after any presence alert for the same entity.

use crate::store::{Store, TrackedEntity};
use crate::types::{AlertEvent, ObservedFlight};

/// First flight in the snapshot carrying `callsign`, if any.
pub fn find_flight<'a>(callsign: &str, flights: &'a [ObservedFlight]) -> Option<&'a ObservedFlight> {
    flights.iter().find(|f| f.callsign == callsign)
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Alerts to deliver, in emission order.
    pub events: Vec<AlertEvent>,
    /// Callsigns matched while already present (no presence transition).
    pub still_present: Vec<String>,
}

/// Reconcile the store against one snapshot.
///
/// Events come out in store order; for a single entity, presence precedes
/// the transponder change.
pub fn reconcile(store: &mut Store, flights: &[ObservedFlight]) -> Vec<AlertEvent> {
    reconcile_detailed(store, flights).events
}

/// Same as [`reconcile`], also reporting which entities stayed present.
pub fn reconcile_detailed(store: &mut Store, flights: &[ObservedFlight]) -> Reconciliation {
    let mut out = Reconciliation::default();
    for entity in store.entities_mut() {
        let observed = find_flight(entity.callsign(), flights);
        if reconcile_entity(entity, observed, &mut out.events) {
            out.still_present.push(entity.callsign().to_string());
        }
    }
    out
}

/// Returns true when the entity was matched and was already present.
fn reconcile_entity(
    entity: &mut TrackedEntity,
    observed: Option<&ObservedFlight>,
    events: &mut Vec<AlertEvent>,
) -> bool {
    match observed {
        Some(flight) => {
            let was_present = entity.present;
            if !was_present {
                entity.present = true;
                events.push(AlertEvent::entered(
                    entity.callsign(),
                    flight.latitude,
                    flight.longitude,
                ));
            }

            if entity.transponder_code != flight.transponder_code {
                entity.transponder_code = flight.transponder_code.clone();
                events.push(AlertEvent::transponder_changed(
                    entity.callsign(),
                    &entity.transponder_code,
                ));
            }
            was_present
        }
        None if entity.present => {
            // Code is kept so a re-entry compares against the last known value
            entity.present = false;
            events.push(AlertEvent::left(entity.callsign()));
            false
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
