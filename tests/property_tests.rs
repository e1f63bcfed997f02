//! Property-based tests for definitions, instances and history.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated graphs and transition sequences.

use chrono::Utc;
use futures::executor::block_on;
use proptest::prelude::*;
use std::sync::Arc;
use transit_fsm::core::{TransitionHistory, TransitionRecord};
use transit_fsm::{Definition, Hook, Machine, MachineConfig, Payload, TransitError};

const RING: [&str; 4] = ["Galba", "Otho", "Vitellius", "Vespasian"];

/// Ring of nodes where "next" moves forward and "back" moves backward.
fn ring() -> Arc<Definition<Payload>> {
    let definition = Arc::new(Definition::new());
    for (index, name) in RING.iter().enumerate() {
        let next = RING[(index + 1) % RING.len()];
        let back = RING[(index + RING.len() - 1) % RING.len()];
        definition
            .node(name)
            .unwrap()
            .transition("next", next, Hook::noop())
            .unwrap()
            .transition("back", back, Hook::noop())
            .unwrap();
    }
    definition.set_initial_node(RING[0]).unwrap();
    definition
}

prop_compose! {
    fn arbitrary_step()(variant in 0..3u8) -> &'static str {
        match variant {
            0 => "next",
            1 => "back",
            _ => "unknown",
        }
    }
}

prop_compose! {
    fn arbitrary_walk()(steps in prop::collection::vec(arbitrary_step(), 0..40)) -> Vec<&'static str> {
        steps
    }
}

prop_compose! {
    fn arbitrary_record()(
        transition in "[a-z]{1,10}",
        from in "[A-Z][a-z]{1,8}",
        to in "[A-Z][a-z]{1,8}",
    ) -> TransitionRecord {
        TransitionRecord {
            transition,
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

fn position(name: &str) -> usize {
    RING.iter().position(|n| *n == name).unwrap()
}

proptest! {
    #[test]
    fn walk_tracks_expected_position(walk in arbitrary_walk()) {
        let machine = ring().instance();
        let mut expected = 0usize;

        for step in walk {
            let result = block_on(machine.transit(step));
            match step {
                "next" => expected = (expected + 1) % RING.len(),
                "back" => expected = (expected + RING.len() - 1) % RING.len(),
                _ => {
                    prop_assert!(
                        matches!(result, Err(TransitError::TransitionMissing { .. })),
                        "expected TransitionMissing, got {:?}",
                        result
                    );
                }
            }
            let current = machine.current_node().unwrap();
            prop_assert_eq!(position(&current), expected);
        }
    }

    #[test]
    fn guard_is_never_left_set(walk in arbitrary_walk()) {
        let machine = ring().instance();

        for step in walk {
            let _ = block_on(machine.transit(step));
            prop_assert!(!machine.is_transiting());
            prop_assert!(machine.current_transition().is_none());
        }
    }

    #[test]
    fn previous_node_is_last_departure(walk in arbitrary_walk()) {
        let machine = ring().instance();
        let mut departed: Option<String> = None;

        for step in walk {
            let before = machine.current_node();
            if block_on(machine.transit(step)).is_ok() {
                departed = before;
            }
            prop_assert_eq!(machine.previous_node(), departed.clone());
        }
    }

    #[test]
    fn history_path_matches_successful_moves(walk in arbitrary_walk()) {
        let machine = Machine::with_config(ring(), MachineConfig { history_limit: None });
        let mut visited = vec![RING[0].to_string()];

        for step in walk {
            if let Ok(transited) = block_on(machine.transit(step)) {
                visited.push(transited.next_node);
            }
        }

        let history = machine.history();
        if history.is_empty() {
            prop_assert_eq!(visited.len(), 1);
        } else {
            prop_assert_eq!(history.path(), visited.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn node_registration_is_idempotent(names in prop::collection::vec("[a-z]{1,6}", 1..20)) {
        let definition = Definition::<Payload>::new();
        let first: Vec<_> = names.iter().map(|n| definition.node(n).unwrap()).collect();
        let second: Vec<_> = names.iter().map(|n| definition.node(n).unwrap()).collect();

        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert!(Arc::ptr_eq(a, b));
        }

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(definition.node_names(), unique);
    }

    #[test]
    fn history_limit_is_respected(
        records in prop::collection::vec(arbitrary_record(), 0..30),
        limit in 1usize..10,
    ) {
        let mut history = TransitionHistory::with_limit(Some(limit));
        for record in records.iter().cloned() {
            history.push(record);
        }

        prop_assert_eq!(history.len(), records.len().min(limit));
        if let Some(last) = records.last() {
            prop_assert_eq!(history.last(), Some(last));
        }
    }

    #[test]
    fn history_preserves_order(records in prop::collection::vec(arbitrary_record(), 1..20)) {
        let mut history = TransitionHistory::new();
        for record in records.iter().cloned() {
            history.push(record);
        }

        let stored: Vec<&TransitionRecord> = history.records().collect();
        prop_assert_eq!(stored.len(), records.len());
        for (stored, original) in stored.iter().zip(records.iter()) {
            prop_assert_eq!(*stored, original);
        }
    }
}
