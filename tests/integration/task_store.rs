//! Integration tests for the task store.
//!
//! Covers the public mutation API, snapshot delivery to subscribers, and
//! the add / reorder / delete walkthrough with a gap left by deletion.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use wayt::tasks::{ReorderCoordinator, Snapshot, Subscription, TaskStore};
use wayt_model::{NewTask, Priority, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Drains every queued snapshot from a subscription.
fn drain(rx: &mut Subscription) -> Vec<Snapshot> {
    let mut out = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        out.push(snapshot);
    }
    out
}

/// Titles in display order.
fn titles(store: &TaskStore) -> Vec<String> {
    store.sorted_view().into_iter().map(|t| t.title).collect()
}

// --- walkthrough ---

#[test]
fn add_reorder_delete_walkthrough() {
    let mut store = TaskStore::new();
    store.add_task(NewTask::new("Buy milk"));
    let walk = store.add_task(NewTask::new("Walk dog").minutes(30));

    let view = store.sorted_view();
    assert_eq!(view.len(), 2);
    assert_eq!((view[0].order, view[0].time_slot.minutes()), (0, 15));
    assert_eq!((view[1].order, view[1].time_slot.minutes()), (1, 30));

    assert!(ReorderCoordinator::new().move_task(&mut store, 0, 1));
    let view = store.sorted_view();
    assert_eq!(view[0].title, "Walk dog");
    assert_eq!(view[0].order, 0);
    assert_eq!(view[1].title, "Buy milk");
    assert_eq!(view[1].order, 1);

    assert!(store.delete_task(&walk));
    let view = store.sorted_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].title, "Buy milk");
    assert_eq!(view[0].order, 1);
}

// --- id tests ---

#[test]
fn back_to_back_adds_get_distinct_ids() {
    let mut store = TaskStore::new();
    let ids: Vec<_> = (0..100)
        .map(|i| store.add_task(NewTask::new(format!("task {i}"))))
        .collect();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 100);
}

// --- subscription tests ---

#[test]
fn every_mutation_publishes_one_snapshot() {
    let mut store = TaskStore::new();
    let mut rx = store.subscribe();

    let id = store.add_task(NewTask::new("Write report"));
    store.toggle_task(&id);
    store.update_task(&id, TaskPatch::new().priority(Some(Priority::High)));
    store.delete_task(&id);

    let snapshots = drain(&mut rx);
    assert_eq!(snapshots.len(), 4);
    let versions: Vec<_> = snapshots.iter().map(Snapshot::version).collect();
    assert_eq!(versions, [1, 2, 3, 4]);
    assert!(snapshots[1].get(&id).unwrap().completed);
    assert_eq!(snapshots[2].get(&id).unwrap().priority, Some(Priority::High));
    assert!(snapshots[3].is_empty());
}

#[test]
fn snapshots_are_isolated_from_later_mutations() {
    let mut store = TaskStore::new();
    let id = store.add_task(NewTask::new("Draft"));
    let before = store.snapshot();
    store.update_task(&id, TaskPatch::new().title("Final"));
    assert_eq!(before.get(&id).unwrap().title, "Draft");
    assert_eq!(store.get(&id).unwrap().title, "Final");
}

#[test]
fn unknown_ids_change_nothing() {
    let mut store = TaskStore::new();
    let id = store.add_task(NewTask::new("Keep"));
    store.delete_task(&id);
    let mut rx = store.subscribe();
    let before = store.snapshot();

    assert!(!store.toggle_task(&id));
    assert!(!store.update_task(&id, TaskPatch::new().title("Ghost")));
    assert!(!store.delete_task(&id));

    assert!(drain(&mut rx).is_empty());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn several_subscribers_see_the_same_snapshot() {
    let mut store = TaskStore::new();
    let mut a = store.subscribe();
    let mut b = store.subscribe();
    store.add_task(NewTask::new("Shared"));
    assert_eq!(drain(&mut a), drain(&mut b));
}

// --- ordering tests ---

#[test]
fn add_after_gap_sorts_last() {
    let mut store = TaskStore::new();
    let first = store.add_task(NewTask::new("A"));
    store.add_task(NewTask::new("B"));
    store.add_task(NewTask::new("C"));
    store.delete_task(&first);

    // B=1, C=2, D goes past the highest order.
    let d = store.add_task(NewTask::new("D"));
    assert_eq!(store.get(&d).unwrap().order, 3);
    assert_eq!(titles(&store), ["B", "C", "D"]);

    ReorderCoordinator::new().move_task(&mut store, 2, 0);
    let orders: Vec<_> = store.sorted_view().iter().map(|t| t.order).collect();
    assert_eq!(orders, [0, 1, 2]);
    assert_eq!(titles(&store), ["D", "B", "C"]);
}

#[test]
fn add_after_several_deletes_sorts_last() {
    let mut store = TaskStore::new();
    let a = store.add_task(NewTask::new("A"));
    let b = store.add_task(NewTask::new("B"));
    store.add_task(NewTask::new("C"));
    store.delete_task(&a);
    store.delete_task(&b);
    store.add_task(NewTask::new("D"));

    assert_eq!(titles(&store), ["C", "D"]);
    let orders: Vec<_> = store.sorted_view().iter().map(|t| t.order).collect();
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn update_preserves_untouched_fields() {
    let mut store = TaskStore::new();
    let id = store.add_task(NewTask::new("Gym").minutes(45).priority(Priority::Low));
    store.update_task(&id, TaskPatch::new().completed(true));
    let task = store.get(&id).unwrap();
    assert!(task.completed);
    assert_eq!(task.title, "Gym");
    assert_eq!(task.time_slot.minutes(), 45);
    assert_eq!(task.priority, Some(Priority::Low));
}
