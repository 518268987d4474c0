//! Tracked flights and their last-known state.
//!
//! Pure data — no I/O. The set of entities is fixed at construction; only
//! the reconciler mutates their `present` flag and transponder code.

/// Last-known state of one flight under watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEntity {
    callsign: String,
    /// Last observed squawk. Empty means never observed.
    pub(crate) transponder_code: String,
    pub(crate) present: bool,
}

impl TrackedEntity {
    pub fn new(callsign: &str) -> Self {
        TrackedEntity {
            callsign: callsign.to_string(),
            transponder_code: String::new(),
            present: false,
        }
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn transponder_code(&self) -> &str {
        &self.transponder_code
    }

    pub fn present(&self) -> bool {
        self.present
    }

    pub fn has_transponder_code(&self) -> bool {
        !self.transponder_code.is_empty()
    }
}

/// Ordered collection of tracked entities, keyed by callsign.
#[derive(Debug, Clone, Default)]
pub struct Store {
    entities: Vec<TrackedEntity>,
}

impl Store {
    /// Build a store from callsigns in the given order.
    ///
    /// Blank callsigns are ignored and repeated ones keep their first position.
    pub fn new<I, S>(callsigns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entities: Vec<TrackedEntity> = Vec::new();
        for cs in callsigns {
            let cs = cs.as_ref().trim();
            if cs.is_empty() || entities.iter().any(|e| e.callsign == cs) {
                continue;
            }
            entities.push(TrackedEntity::new(cs));
        }
        Store { entities }
    }

    /// All entities in insertion order.
    pub fn get_all(&self) -> &[TrackedEntity] {
        &self.entities
    }

    pub fn find(&self, callsign: &str) -> Option<&TrackedEntity> {
        self.entities.iter().find(|e| e.callsign == callsign)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities currently inside the region.
    pub fn present_count(&self) -> usize {
        self.entities.iter().filter(|e| e.present).count()
    }

    pub(crate) fn entities_mut(&mut self) -> std::slice::IterMut<'_, TrackedEntity> {
        self.entities.iter_mut()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
