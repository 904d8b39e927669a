//! Combining owned and invited events into one read model.
//!
//! Every function here takes its inputs by reference and returns a new
//! collection, so a consumer can detect changes by comparing values.

use std::collections::{HashMap, HashSet};

use crate::event::Event;

/// Deduplicated union of `owned` and `invited`, keyed by event id.
///
/// When an id appears on both sides the owned copy is kept. Duplicates within
/// one side collapse to the last occurrence. Order is owned first, then
/// invited, each in first-seen order; callers that need chronological order
/// use [`sort_by_start`].
pub fn merge(owned: &[Event], invited: &[Event]) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::with_capacity(owned.len() + invited.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for event in owned {
        upsert_indexed(&mut merged, &mut index, event);
    }

    let owned_ids: HashSet<&str> = owned.iter().map(|e| e.id.as_str()).collect();
    for event in invited.iter().filter(|e| !owned_ids.contains(e.id.as_str())) {
        upsert_indexed(&mut merged, &mut index, event);
    }

    merged
}

fn upsert_indexed<'a>(merged: &mut Vec<Event>, index: &mut HashMap<&'a str, usize>, event: &'a Event) {
    match index.get(event.id.as_str()) {
        Some(&i) => merged[i] = event.clone(),
        None => {
            index.insert(event.id.as_str(), merged.len());
            merged.push(event.clone());
        }
    }
}

/// Copy of `events` ordered by start time, ties broken by id.
pub fn sort_by_start(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
    sorted
}

/// Copy of `events` with `event` replacing the entry of the same id, or appended.
pub fn upsert(events: &[Event], event: &Event) -> Vec<Event> {
    let mut updated = events.to_vec();
    match updated.iter_mut().find(|e| e.id == event.id) {
        Some(existing) => *existing = event.clone(),
        None => updated.push(event.clone()),
    }
    updated
}

/// Copy of `events` without the entry `event_id`.
pub fn remove(events: &[Event], event_id: &str) -> Vec<Event> {
    events.iter().filter(|e| e.id != event_id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, hour, 0, 0).unwrap()
    }

    fn event(id: &str, title: &str, hour: u32) -> Event {
        Event {
            id: id.to_string(),
            user_id: "alice".to_string(),
            title: title.to_string(),
            description: None,
            start_time: at(hour),
            end_time: at(hour + 1),
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(events: &[Event]) -> HashSet<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_merge_disjoint_sets() {
        let owned = vec![event("a", "Mine", 9)];
        let invited = vec![event("b", "Theirs", 10)];
        let merged = merge(&owned, &invited);
        assert_eq!(merged.len(), 2);
        assert_eq!(ids(&merged), ids(&[owned[0].clone(), invited[0].clone()]));
    }

    #[test]
    fn test_merge_owned_wins_on_duplicate_id() {
        let owned = vec![event("a", "Owned copy", 9)];
        let invited = vec![event("a", "Invited copy", 9), event("b", "Other", 11)];
        let merged = merge(&owned, &invited);
        assert_eq!(merged.len(), 2);
        let a = merged.iter().find(|e| e.id == "a").unwrap();
        assert_eq!(a.title, "Owned copy");
    }

    #[test]
    fn test_merge_collapses_duplicates_within_one_side() {
        let invited = vec![event("b", "First", 9), event("b", "Second", 9)];
        let merged = merge(&[], &invited);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Second");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let owned = vec![event("a", "A", 9), event("c", "C", 12)];
        let invited = vec![event("a", "A'", 9), event("b", "B", 10)];
        let once = merge(&owned, &invited);
        let twice = merge(&once, &[]);
        assert_eq!(once, twice);
        assert_eq!(merge(&twice, &invited), once);
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let owned = vec![event("a", "A", 9)];
        let invited = vec![event("a", "Other", 9)];
        let before = (owned.clone(), invited.clone());
        let _ = merge(&owned, &invited);
        assert_eq!((owned, invited), before);
    }

    #[test]
    fn test_sort_by_start() {
        let events = vec![event("b", "B", 11), event("a", "A", 9), event("c", "C", 11)];
        let sorted: Vec<String> = sort_by_start(&events).into_iter().map(|e| e.id).collect();
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_upsert_and_remove() {
        let events = vec![event("a", "A", 9)];
        let replaced = upsert(&events, &event("a", "A2", 10));
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].title, "A2");
        assert_eq!(events[0].title, "A");

        let appended = upsert(&replaced, &event("b", "B", 12));
        assert_eq!(appended.len(), 2);

        let removed = remove(&appended, "a");
        assert_eq!(ids(&removed), HashSet::from(["b".to_string()]));
    }
}
