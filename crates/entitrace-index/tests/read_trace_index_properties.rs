//! Property-based tests for the read trace index
//!
//! For any sequence of registrations the index must stay symmetric, never
//! keep empty entries, replace rather than accumulate, answer union queries
//! consistently and merge by deep copy.

use std::collections::{HashMap, HashSet};

use entitrace_index::{trace_set, ReadTraceHash, ReadTraceHashSet, ReadTraceIndex};
use proptest::prelude::*;

// Small value ranges so consumers and traces collide often
fn arb_traces() -> impl Strategy<Value = Vec<ReadTraceHash>> {
    prop::collection::vec(0u64..16, 0..6)
}

fn arb_ops() -> impl Strategy<Value = Vec<(u8, Vec<ReadTraceHash>)>> {
    prop::collection::vec((0u8..6, arb_traces()), 0..40)
}

fn apply(index: &mut ReadTraceIndex<u8>, ops: &[(u8, Vec<ReadTraceHash>)]) {
    for (consumer, traces) in ops {
        index.set(trace_set(traces.iter().copied()), *consumer);
    }
}

/// Last registration of every consumer, as a plain model
fn model(ops: &[(u8, Vec<ReadTraceHash>)]) -> HashMap<u8, HashSet<ReadTraceHash>> {
    let mut model = HashMap::new();
    for (consumer, traces) in ops {
        let traces: HashSet<_> = traces.iter().copied().collect();
        if traces.is_empty() {
            model.remove(consumer);
        } else {
            model.insert(*consumer, traces);
        }
    }
    model
}

proptest! {
    #[test]
    fn prop_index_stays_consistent(ops in arb_ops()) {
        let mut index = ReadTraceIndex::new();
        for (consumer, traces) in &ops {
            index.set(trace_set(traces.iter().copied()), *consumer);
            prop_assert!(index.check_consistency().is_ok());
        }
    }

    #[test]
    fn prop_index_matches_last_registration(ops in arb_ops()) {
        let mut index = ReadTraceIndex::new();
        apply(&mut index, &ops);
        let expected = model(&ops);

        prop_assert_eq!(index.consumer_count(), expected.len());
        for consumer in 0u8..6 {
            let traces: HashSet<_> = index.traces_of(&consumer).into_iter().collect();
            let wanted = expected.get(&consumer).cloned().unwrap_or_default();
            prop_assert_eq!(traces, wanted);
        }
        for trace in 0u64..16 {
            let actual: HashSet<u8> = index.get(trace).into_iter().collect();
            let wanted: HashSet<u8> = expected
                .iter()
                .filter(|(_, traces)| traces.contains(&trace))
                .map(|(consumer, _)| *consumer)
                .collect();
            prop_assert_eq!(actual, wanted);
        }
    }

    #[test]
    fn prop_set_is_idempotent(ops in arb_ops(), consumer in 0u8..6, traces in arb_traces()) {
        let mut once = ReadTraceIndex::new();
        apply(&mut once, &ops);
        let mut twice = once.clone();

        once.set(trace_set(traces.iter().copied()), consumer);
        twice.set(trace_set(traces.iter().copied()), consumer);
        twice.set(trace_set(traces.iter().copied()), consumer);

        prop_assert_eq!(once.consumer_count(), twice.consumer_count());
        prop_assert_eq!(once.trace_count(), twice.trace_count());
        for trace in 0u64..16 {
            prop_assert_eq!(once.get(trace), twice.get(trace));
        }
    }

    #[test]
    fn prop_get_many_is_union(ops in arb_ops(), queried in arb_traces()) {
        let mut index = ReadTraceIndex::new();
        apply(&mut index, &ops);

        let queried: ReadTraceHashSet = trace_set(queried);
        let mut union = HashSet::new();
        for trace in &queried {
            union.extend(index.get(*trace));
        }
        let many: HashSet<u8> = index.get_many(&queried).into_iter().collect();
        prop_assert_eq!(many, union);
    }

    #[test]
    fn prop_pull_is_deep_copy(
        ops in arb_ops(),
        later in arb_ops(),
    ) {
        let mut source = ReadTraceIndex::new();
        apply(&mut source, &ops);

        let mut target = ReadTraceIndex::new();
        target.pull(&source);
        let before: Vec<_> = (0u64..16).map(|t| target.get(t)).collect();

        apply(&mut source, &later);

        let after: Vec<_> = (0u64..16).map(|t| target.get(t)).collect();
        prop_assert_eq!(before, after);
        prop_assert!(target.check_consistency().is_ok());
    }

    #[test]
    fn prop_pull_into_populated_index_overrides_consumers(
        existing in arb_ops(),
        incoming in arb_ops(),
    ) {
        let mut target = ReadTraceIndex::new();
        apply(&mut target, &existing);
        let mut source = ReadTraceIndex::new();
        apply(&mut source, &incoming);

        target.pull(&source);
        prop_assert!(target.check_consistency().is_ok());

        let existing_model = model(&existing);
        let incoming_model = model(&incoming);
        for consumer in 0u8..6 {
            let traces: HashSet<_> = target.traces_of(&consumer).into_iter().collect();
            let wanted = incoming_model
                .get(&consumer)
                .or_else(|| existing_model.get(&consumer))
                .cloned()
                .unwrap_or_default();
            prop_assert_eq!(traces, wanted);
        }
    }
}

#[test]
fn end_to_end_registration_scenario() {
    let mut index = ReadTraceIndex::new();

    index.set(trace_set([1, 2]), "consumerX");
    assert_eq!(index.get(1).into_iter().collect::<Vec<_>>(), vec!["consumerX"]);
    assert_eq!(index.get(2).into_iter().collect::<Vec<_>>(), vec!["consumerX"]);

    index.set(trace_set([2, 3]), "consumerX");
    assert!(index.get(1).is_empty());
    assert_eq!(index.get(2).into_iter().collect::<Vec<_>>(), vec!["consumerX"]);
    assert_eq!(index.get(3).into_iter().collect::<Vec<_>>(), vec!["consumerX"]);

    index.set(trace_set([]), "consumerX");
    assert!(index.get(2).is_empty());
    assert!(index.get(3).is_empty());

    index.set(trace_set([5]), "A");
    index.set(trace_set([5]), "B");
    let mut both: Vec<_> = index.get(5).into_iter().collect();
    both.sort();
    assert_eq!(both, vec!["A", "B"]);

    index.set(trace_set([]), "A");
    assert_eq!(index.get(5).into_iter().collect::<Vec<_>>(), vec!["B"]);
}
