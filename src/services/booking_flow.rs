use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{BookingFlowState, FlowSnapshot};

/// Process-wide map from conversation key to booking-flow state, owned by the
/// application state so tests can build isolated registries. Entries are
/// created idle on first access and handed out as shared handles; the map slot
/// is never overwritten, so concurrent augmentation calls for the same key
/// always mutate the same object.
pub struct BookingFlowRegistry {
    flows: Mutex<HashMap<String, Arc<Mutex<BookingFlowState>>>>,
}

impl Default for BookingFlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlowRegistry {
    pub fn new() -> Self {
        Self {
            flows: Mutex::new(HashMap::new()),
        }
    }

    pub fn flow(&self, key: &str) -> Arc<Mutex<BookingFlowState>> {
        let mut flows = self.flows.lock().unwrap();
        Arc::clone(
            flows
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(BookingFlowState::new()))),
        )
    }

    pub fn snapshot(&self, key: &str) -> FlowSnapshot {
        self.flow(key).lock().unwrap().snapshot()
    }

    pub fn reset(&self, key: &str) {
        self.flow(key).lock().unwrap().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlowStage;

    #[test]
    fn test_entry_is_singleton_per_key() {
        let registry = BookingFlowRegistry::new();
        let a = registry.flow("conv-1");
        let b = registry.flow("conv-1");
        assert!(Arc::ptr_eq(&a, &b));

        let other = registry.flow("conv-2");
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[test]
    fn test_mutation_visible_through_shared_entry() {
        let registry = BookingFlowRegistry::new();
        let entry = registry.flow("conv-1");
        entry.lock().unwrap().mark_offered("backend_payload");

        let snapshot = registry.snapshot("conv-1");
        assert_eq!(snapshot.stage, FlowStage::Offered);
        assert!(snapshot.offered);
    }

    #[test]
    fn test_happy_path_transitions() {
        let registry = BookingFlowRegistry::new();
        let entry = registry.flow("conv-1");
        let mut state = entry.lock().unwrap();

        assert_eq!(state.stage, FlowStage::Idle);
        state.mark_offered("intent_heuristic");
        assert_eq!(state.stage, FlowStage::Offered);
        state.mark_awaiting_slots();
        assert_eq!(state.stage, FlowStage::AwaitingSlotChoice);
        state.mark_completed(Some("apt-1".to_string()));
        assert_eq!(state.stage, FlowStage::Completed);
        assert!(state.completed);
        assert_eq!(state.appointment_id.as_deref(), Some("apt-1"));
    }

    #[test]
    fn test_declined_is_sticky() {
        let registry = BookingFlowRegistry::new();
        let entry = registry.flow("conv-1");
        let mut state = entry.lock().unwrap();

        state.mark_offered("intent_heuristic");
        state.mark_declined();
        assert_eq!(state.stage, FlowStage::Declined);

        state.mark_offered("intent_heuristic");
        state.mark_awaiting_slots();
        state.mark_completed(None);
        assert_eq!(state.stage, FlowStage::Declined);
        assert!(!state.completed);
    }

    #[test]
    fn test_completed_is_sticky() {
        let registry = BookingFlowRegistry::new();
        let entry = registry.flow("conv-1");
        let mut state = entry.lock().unwrap();

        state.mark_offered("backend_payload");
        state.mark_completed(Some("apt-1".to_string()));

        state.mark_declined();
        state.mark_offered("backend_payload");
        assert_eq!(state.stage, FlowStage::Completed);
        assert_eq!(state.appointment_id.as_deref(), Some("apt-1"));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let registry = BookingFlowRegistry::new();
        {
            let entry = registry.flow("conv-1");
            let mut state = entry.lock().unwrap();
            state.mark_offered("backend_payload");
            state.mark_declined();
        }

        registry.reset("conv-1");

        let snapshot = registry.snapshot("conv-1");
        assert_eq!(snapshot.stage, FlowStage::Idle);
        assert!(!snapshot.offered);
        assert!(!snapshot.dismissed);
        assert_eq!(snapshot.stage_reason.as_deref(), Some("reset"));

        // Reset cleared the state but kept the same shared entry.
        let entry = registry.flow("conv-1");
        entry.lock().unwrap().mark_offered("backend_payload");
        assert_eq!(registry.snapshot("conv-1").stage, FlowStage::Offered);
    }
}
