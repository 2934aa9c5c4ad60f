use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::event::definition::EventDefinition;

/// First wire id handed to user declarations. Everything below is reserved
/// for the standard events.
pub const FIRST_USER_WIRE_ID: u32 = 100;

// Allocation is deliberately a separate path from registration: ids stay
// unique even though a call site takes the registry lock only afterwards.
static NEXT_WIRE_ID: AtomicU32 = AtomicU32::new(FIRST_USER_WIRE_ID);

pub(crate) fn next_wire_id() -> u32 {
    NEXT_WIRE_ID.fetch_add(1, Ordering::Relaxed)
}

lazy_static::lazy_static! {
    static ref REGISTRY: EventRegistry = EventRegistry::default();
}

/// Process-wide, append-only sequence of event definitions. Definitions are
/// never removed or reordered; readers take snapshot copies so no reference
/// ever escapes the lock.
#[derive(Default)]
pub struct EventRegistry {
    definitions: Mutex<Vec<EventDefinition>>,
}

impl EventRegistry {
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    pub fn add(&self, definition: EventDefinition) {
        self.definitions.lock().unwrap().push(definition);
    }

    /// Copies out every definition registered so far, in registration order.
    pub fn snapshot(&self) -> Vec<EventDefinition> {
        self.definitions.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::event::definition::EventClass;

    #[test]
    fn test_wire_ids_start_in_user_range() {
        assert!(next_wire_id() >= FIRST_USER_WIRE_ID);
    }

    #[test]
    fn test_wire_ids_are_unique_across_threads() {
        let mut handles = Vec::new();
        for _ in 0..8 {
            handles.push(thread::spawn(|| {
                (0..128).map(|_| next_wire_id()).collect::<Vec<u32>>()
            }));
        }
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "wire id {} allocated twice", id);
            }
        }
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        // The registry is global; assert on relative order of our own ids.
        let first = next_wire_id();
        let second = next_wire_id();
        let registry = EventRegistry::global();
        registry.add(EventDefinition::new::<()>(
            first,
            EventClass::Instance,
            0,
            "RegistryTest#First",
        ));
        registry.add(EventDefinition::new::<()>(
            second,
            EventClass::Instance,
            0,
            "RegistryTest#Second",
        ));
        let snapshot = registry.snapshot();
        let first_at = snapshot.iter().position(|d| d.wire_id() == first);
        let second_at = snapshot.iter().position(|d| d.wire_id() == second);
        assert!(first_at.unwrap() < second_at.unwrap());
    }
}
