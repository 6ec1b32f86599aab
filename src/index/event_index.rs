//! Primary index over all chart events.
//!
//! One tree ordered by `event_order` answers lookups on both axes: rows are
//! the tree key, and chart time works through probe closures because the
//! rate-altering timeline stamps seconds that never decrease in event order
//! (warped events collapse to equal-time runs, which the boundary walks
//! absorb).

use std::cmp::Ordering;
use std::rc::Rc;

use failure_derive::Fail;
use float_ord::FloatOrd;
use fxhash::FxHashSet;
use log::trace;

use crate::chart::event::{event_order, Event, EventKindId, Lane};
use crate::collections::ordered_tree::{Iter, OrderedTree};
use crate::index::search;
use crate::time::Seconds;

pub type EventComparator = fn(&Rc<Event>, &Rc<Event>) -> Ordering;

fn order(a: &Rc<Event>, b: &Rc<Event>) -> Ordering {
  event_order(a, b)
}

pub(crate) fn row_probe(row: f64) -> impl Fn(&Rc<Event>) -> Ordering {
  move |e: &Rc<Event>| FloatOrd(f64::from(e.row())).cmp(&FloatOrd(row))
}

pub(crate) fn time_probe(seconds: Seconds) -> impl Fn(&Rc<Event>) -> Ordering {
  move |e: &Rc<Event>| FloatOrd(e.seconds()).cmp(&FloatOrd(seconds))
}

#[derive(Debug, Fail)]
pub enum ValidationError {
  #[fail(display = "comparator asymmetry between rows {} and {}", left_row, right_row)]
  ComparatorAsymmetry { left_row: u32, right_row: u32 },

  #[fail(display = "events out of order at rows {} and {}", left_row, right_row)]
  OutOfOrder { left_row: u32, right_row: u32 },

  #[fail(display = "duplicate note at row {} lane {}", row, lane)]
  DuplicateLaneEvent { row: u32, lane: Lane },

  #[fail(display = "duplicate {:?} event at row {}", kind, row)]
  DuplicateKindEvent { row: u32, kind: EventKindId },

  #[fail(display = "duration event at row {} ends at earlier row {}", row, end_row)]
  MalformedDuration { row: u32, end_row: u32 },
}

pub struct EventIndex {
  pub(crate) tree: OrderedTree<Rc<Event>, EventComparator>,
}

impl EventIndex {
  pub fn new() -> EventIndex {
    EventIndex {
      tree: OrderedTree::new(order),
    }
  }

  pub fn len(&self) -> usize {
    self.tree.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tree.is_empty()
  }

  pub fn insert(&mut self, event: Rc<Event>) {
    debug_assert!(self.validate().is_ok(), "index invalid before insert");
    trace!("index insert {:?} at row {}", event.kind_id(), event.row());
    self.tree.insert(event);
    debug_assert!(self.validate().is_ok(), "index invalid after insert");
  }

  pub fn remove(&mut self, event: &Event) -> Option<Rc<Event>> {
    debug_assert!(self.validate().is_ok(), "index invalid before remove");
    let id = event.id();
    let removed = self
      .tree
      .remove_by(|e| event_order(e, event), |e| e.id() == id);
    if let Some(removed) = &removed {
      trace!("index remove {:?} at row {}", removed.kind_id(), removed.row());
    }
    debug_assert!(self.validate().is_ok(), "index invalid after remove");
    removed
  }

  pub fn clear(&mut self) {
    self.tree.clear();
  }

  /// Reinserts every event under the current comparator inputs. Called after
  /// the timeline restamps chart times.
  pub fn rebuild(&mut self) {
    let events = self.tree.drain();
    for event in events {
      self.tree.insert(event);
    }
  }

  pub fn iter(&self) -> Iter<Rc<Event>, EventComparator> {
    self.tree.iter()
  }

  pub fn first_event(&self) -> Option<Rc<Event>> {
    self.tree.first().current().cloned()
  }

  pub fn last_event(&self) -> Option<Rc<Event>> {
    self.tree.last().current().cloned()
  }

  /// The event nearest `row`, preferring the greatest one at or before it
  /// and falling back to the least one after it.
  pub fn find_best_by_position(&self, row: f64) -> Option<Rc<Event>> {
    self
      .find_greatest_at_or_before_position(row)
      .or_else(|| self.first_event())
  }

  /// Time-axis counterpart of `find_best_by_position`.
  pub fn find_best_by_time(&self, seconds: Seconds) -> Option<Rc<Event>> {
    self
      .find_greatest_at_or_before_time(seconds)
      .or_else(|| self.first_event())
  }

  pub fn find_greatest_before_position(&self, row: f64) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.tree, row_probe(row), false).cloned()
  }

  pub fn find_greatest_at_or_before_position(&self, row: f64) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.tree, row_probe(row), true).cloned()
  }

  pub fn find_least_after_position(&self, row: f64) -> Option<Rc<Event>> {
    search::least_following(&self.tree, row_probe(row), false).cloned()
  }

  pub fn find_least_at_or_after_position(&self, row: f64) -> Option<Rc<Event>> {
    search::least_following(&self.tree, row_probe(row), true).cloned()
  }

  pub fn find_greatest_before_time(&self, seconds: Seconds) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.tree, time_probe(seconds), false).cloned()
  }

  pub fn find_greatest_at_or_before_time(&self, seconds: Seconds) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.tree, time_probe(seconds), true).cloned()
  }

  pub fn find_least_after_time(&self, seconds: Seconds) -> Option<Rc<Event>> {
    search::least_following(&self.tree, time_probe(seconds), false).cloned()
  }

  pub fn find_least_at_or_after_time(&self, seconds: Seconds) -> Option<Rc<Event>> {
    search::least_following(&self.tree, time_probe(seconds), true).cloned()
  }

  /// The event strictly before `row`, wrapping to the last event so cursor
  /// navigation cycles through the chart.
  pub fn find_previous_event_with_looping(&self, row: f64) -> Option<Rc<Event>> {
    self
      .find_greatest_before_position(row)
      .or_else(|| self.last_event())
  }

  /// The event strictly after `row`, wrapping to the first event.
  pub fn find_next_event_with_looping(&self, row: f64) -> Option<Rc<Event>> {
    self
      .find_least_after_position(row)
      .or_else(|| self.first_event())
  }

  /// The note occupying `row` in `lane`: either a note starting exactly
  /// there or a hold whose span covers it. Starts from the last event at or
  /// before the row and scans backward; the nearest same-lane event decides,
  /// since a later note in the lane would end any earlier hold's claim to
  /// the row. With `ignore_editing`, notes mid-drag are invisible.
  pub fn find_note_at(&self, row: u32, lane: Lane, ignore_editing: bool) -> Option<Rc<Event>> {
    let mut cursor = self.tree.find_greatest_preceding(row_probe(f64::from(row)), true);
    loop {
      let mut ahead = cursor.clone();
      if !ahead.move_next() {
        break;
      }
      match ahead.current() {
        Some(e) if e.row() <= row => cursor = ahead,
        _ => break,
      }
    }
    loop {
      let event = cursor.current()?;
      let skip = ignore_editing && event.is_being_edited();
      if !skip && event.lane() == Some(lane) && event.row() <= row {
        if event.row() == row {
          return Some(event.clone());
        }
        return match event.end_row() {
          Some(end) if end >= row => Some(event.clone()),
          _ => None,
        };
      }
      if !cursor.move_prev() {
        return None;
      }
    }
  }

  /// All events at exactly `row`, in index order.
  pub fn find_events_at_row(&self, row: u32) -> Vec<Rc<Event>> {
    self.events_in_range(row, row)
  }

  /// All events with `low <= row <= high`, in index order.
  pub fn events_in_range(&self, low: u32, high: u32) -> Vec<Rc<Event>> {
    let mut out = Vec::new();
    let mut cursor = search::least_following_cursor(&self.tree, row_probe(f64::from(low)), true);
    while let Some(event) = cursor.current() {
      if event.row() > high {
        break;
      }
      out.push(event.clone());
      if !cursor.move_next() {
        break;
      }
    }
    out
  }

  /// Full-structure check of the index invariants: events in order under a
  /// symmetric comparator, at most one note per row/lane and one non-lane
  /// event per row/kind, duration events ending at or after their row.
  pub fn validate(&self) -> Result<(), ValidationError> {
    let mut lanes: FxHashSet<(u32, Lane)> = FxHashSet::default();
    let mut kinds: FxHashSet<(u32, EventKindId)> = FxHashSet::default();
    let mut prev: Option<&Rc<Event>> = None;
    for event in self.tree.iter() {
      if let Some(prev) = prev {
        let forward = event_order(prev, event);
        let backward = event_order(event, prev);
        let symmetric = match forward {
          Ordering::Less => backward == Ordering::Greater,
          Ordering::Equal => backward == Ordering::Equal,
          Ordering::Greater => backward == Ordering::Less,
        };
        if !symmetric {
          return Err(ValidationError::ComparatorAsymmetry {
            left_row: prev.row(),
            right_row: event.row(),
          });
        }
        if forward == Ordering::Greater {
          return Err(ValidationError::OutOfOrder {
            left_row: prev.row(),
            right_row: event.row(),
          });
        }
      }
      if let Some(end_row) = event.end_row() {
        if end_row < event.row() {
          return Err(ValidationError::MalformedDuration {
            row: event.row(),
            end_row,
          });
        }
      }
      match event.lane() {
        Some(lane) => {
          if !lanes.insert((event.row(), lane)) {
            return Err(ValidationError::DuplicateLaneEvent {
              row: event.row(),
              lane,
            });
          }
        }
        None => {
          if !kinds.insert((event.row(), event.kind_id())) {
            return Err(ValidationError::DuplicateKindEvent {
              row: event.row(),
              kind: event.kind_id(),
            });
          }
        }
      }
      prev = Some(event);
    }
    Ok(())
  }
}

impl Default for EventIndex {
  fn default() -> EventIndex {
    EventIndex::new()
  }
}

#[cfg(test)]
mod test {

  use std::rc::Rc;

  use super::EventIndex;
  use crate::chart::event::{Event, EventKind, EventKindId, Lane};

  pub fn note(row: u32, lane: Lane) -> Rc<Event> {
    Rc::new(Event::new(row, EventKind::Note { lane, end_row: None }))
  }

  pub fn hold(row: u32, lane: Lane, end_row: u32) -> Rc<Event> {
    Rc::new(Event::new(
      row,
      EventKind::Note {
        lane,
        end_row: Some(end_row),
      },
    ))
  }

  pub fn tempo(row: u32) -> Rc<Event> {
    Rc::new(Event::new(row, EventKind::Tempo { bpm: 120.0 }))
  }

  pub fn stop(row: u32) -> Rc<Event> {
    Rc::new(Event::new(row, EventKind::Stop { seconds: 0.5 }))
  }

  fn index_of(events: &[Rc<Event>]) -> EventIndex {
    let mut index = EventIndex::new();
    for event in events {
      index.insert(event.clone());
    }
    index
  }

  #[test]
  pub fn empty_index_answers_none_everywhere() {
    let index = EventIndex::new();
    assert!(index.find_best_by_position(10.0).is_none());
    assert!(index.find_best_by_time(1.0).is_none());
    assert!(index.find_previous_event_with_looping(10.0).is_none());
    assert!(index.find_next_event_with_looping(10.0).is_none());
    assert!(index.find_note_at(10, 0, false).is_none());
    assert!(index.find_events_at_row(10).is_empty());
  }

  #[test]
  pub fn single_event_is_best_from_both_sides() {
    let event = note(10, 0);
    let index = index_of(&[event.clone()]);
    assert_eq!(index.find_best_by_position(5.0).map(|e| e.id()), Some(event.id()));
    assert_eq!(index.find_best_by_position(10.0).map(|e| e.id()), Some(event.id()));
    assert_eq!(index.find_best_by_position(15.0).map(|e| e.id()), Some(event.id()));
  }

  #[test]
  pub fn best_by_position_prefers_the_preceding_event() {
    let a = note(10, 0);
    let b = note(20, 0);
    let index = index_of(&[a.clone(), b.clone()]);
    assert_eq!(index.find_best_by_position(15.0).map(|e| e.id()), Some(a.id()));
    assert_eq!(index.find_best_by_position(20.0).map(|e| e.id()), Some(b.id()));
    assert_eq!(index.find_best_by_position(5.0).map(|e| e.id()), Some(a.id()));
  }

  #[test]
  pub fn best_by_time_prefers_the_preceding_event() {
    let a = note(10, 0);
    let b = note(20, 0);
    a.set_seconds(1.0);
    b.set_seconds(2.0);
    let index = index_of(&[a.clone(), b.clone()]);
    assert_eq!(index.find_best_by_time(1.5).map(|e| e.id()), Some(a.id()));
    assert_eq!(index.find_best_by_time(2.0).map(|e| e.id()), Some(b.id()));
    assert_eq!(index.find_best_by_time(0.5).map(|e| e.id()), Some(a.id()));
  }

  #[test]
  pub fn looping_navigation_wraps_around() {
    let a = note(10, 0);
    let b = note(20, 0);
    let c = note(30, 0);
    let index = index_of(&[a.clone(), b.clone(), c.clone()]);
    assert_eq!(index.find_previous_event_with_looping(15.0).map(|e| e.id()), Some(a.id()));
    assert_eq!(index.find_next_event_with_looping(15.0).map(|e| e.id()), Some(b.id()));
    // Strictly past either end, navigation wraps.
    assert_eq!(index.find_previous_event_with_looping(5.0).map(|e| e.id()), Some(c.id()));
    assert_eq!(index.find_next_event_with_looping(35.0).map(|e| e.id()), Some(a.id()));
    assert_eq!(index.find_previous_event_with_looping(10.0).map(|e| e.id()), Some(c.id()));
    assert_eq!(index.find_next_event_with_looping(30.0).map(|e| e.id()), Some(a.id()));
  }

  #[test]
  pub fn row_boundaries_are_exact_across_tie_runs() {
    let t = tempo(10);
    let s = stop(10);
    let n = note(20, 0);
    let index = index_of(&[t.clone(), s.clone(), n.clone()]);
    assert!(index.find_greatest_before_position(10.0).is_none());
    // The stop orders after the tempo at the same row.
    assert_eq!(
      index.find_greatest_at_or_before_position(10.0).map(|e| e.id()),
      Some(s.id())
    );
    assert_eq!(index.find_least_after_position(10.0).map(|e| e.id()), Some(n.id()));
    assert_eq!(
      index.find_least_at_or_after_position(10.0).map(|e| e.id()),
      Some(t.id())
    );
  }

  #[test]
  pub fn time_boundaries_are_exact_across_warped_runs() {
    // A warp collapses rows 10 and 12 to the same chart time.
    let a = note(10, 0);
    let b = note(12, 0);
    let c = note(20, 0);
    a.set_seconds(1.0);
    b.set_seconds(1.0);
    c.set_seconds(2.0);
    let index = index_of(&[a.clone(), b.clone(), c.clone()]);
    assert!(index.find_greatest_before_time(1.0).is_none());
    assert_eq!(index.find_greatest_at_or_before_time(1.0).map(|e| e.id()), Some(b.id()));
    assert_eq!(index.find_least_after_time(1.0).map(|e| e.id()), Some(c.id()));
    assert_eq!(index.find_least_at_or_after_time(1.0).map(|e| e.id()), Some(a.id()));
  }

  #[test]
  pub fn find_note_at_matches_exact_row() {
    let a = note(10, 2);
    let index = index_of(&[a.clone(), note(10, 3), tempo(10)]);
    assert_eq!(index.find_note_at(10, 2, false).map(|e| e.id()), Some(a.id()));
    assert!(index.find_note_at(10, 1, false).is_none());
    assert!(index.find_note_at(11, 2, false).is_none());
  }

  #[test]
  pub fn find_note_at_sees_covering_hold() {
    let h = hold(10, 2, 50);
    let index = index_of(&[h.clone(), note(30, 3), tempo(40)]);
    assert_eq!(index.find_note_at(10, 2, false).map(|e| e.id()), Some(h.id()));
    assert_eq!(index.find_note_at(30, 2, false).map(|e| e.id()), Some(h.id()));
    assert_eq!(index.find_note_at(50, 2, false).map(|e| e.id()), Some(h.id()));
    assert!(index.find_note_at(60, 2, false).is_none());
    assert!(index.find_note_at(30, 1, false).is_none());
  }

  #[test]
  pub fn later_note_in_lane_shadows_an_earlier_hold() {
    // The hold's stored span still covers row 40, but the tap at row 30 is
    // the nearest lane event there and it does not cover 40.
    let h = hold(10, 2, 50);
    let t = note(30, 2);
    let index = index_of(&[h.clone(), t.clone()]);
    assert_eq!(index.find_note_at(30, 2, false).map(|e| e.id()), Some(t.id()));
    assert!(index.find_note_at(40, 2, false).is_none());
    assert_eq!(index.find_note_at(20, 2, false).map(|e| e.id()), Some(h.id()));
  }

  #[test]
  pub fn find_note_at_can_ignore_events_being_edited() {
    let h = hold(10, 2, 50);
    let index = index_of(&[h.clone()]);
    h.set_being_edited(true);
    assert!(index.find_note_at(30, 2, true).is_none());
    assert_eq!(index.find_note_at(30, 2, false).map(|e| e.id()), Some(h.id()));
    h.set_being_edited(false);
    assert_eq!(index.find_note_at(30, 2, true).map(|e| e.id()), Some(h.id()));
  }

  #[test]
  pub fn events_at_row_come_back_in_index_order() {
    let t = tempo(10);
    let s = stop(10);
    let a = note(10, 0);
    let b = note(10, 3);
    let index = index_of(&[b.clone(), a.clone(), s.clone(), t.clone(), note(20, 0)]);
    let at_row: Vec<_> = index.find_events_at_row(10).iter().map(|e| e.id()).collect();
    assert_eq!(at_row, vec![t.id(), s.id(), a.id(), b.id()]);
    assert!(index.find_events_at_row(15).is_empty());
  }

  #[test]
  pub fn range_enumeration_is_inclusive_on_both_ends() {
    let a = note(10, 0);
    let b = note(20, 0);
    let c = note(30, 0);
    let index = index_of(&[a.clone(), b.clone(), c.clone()]);
    let ids: Vec<_> = index.events_in_range(10, 20).iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![a.id(), b.id()]);
    let ids: Vec<_> = index.events_in_range(11, 29).iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![b.id()]);
    assert!(index.events_in_range(31, 40).is_empty());
  }

  #[test]
  pub fn remove_targets_the_exact_event() {
    let a = note(10, 0);
    let b = note(10, 1);
    let mut index = index_of(&[a.clone(), b.clone()]);
    let removed = index.remove(&a);
    assert_eq!(removed.map(|e| e.id()), Some(a.id()));
    assert_eq!(index.len(), 1);
    assert!(index.remove(&a).is_none());
    assert_eq!(index.find_events_at_row(10)[0].id(), b.id());
  }

  #[test]
  pub fn rebuild_restores_time_order_after_restamping() {
    let a = note(10, 0);
    let b = note(20, 0);
    a.set_seconds(1.0);
    b.set_seconds(2.0);
    let mut index = index_of(&[a.clone(), b.clone()]);
    a.set_seconds(0.25);
    b.set_seconds(0.5);
    index.rebuild();
    assert_eq!(index.find_best_by_time(0.3).map(|e| e.id()), Some(a.id()));
    assert_eq!(index.find_best_by_time(0.6).map(|e| e.id()), Some(b.id()));
    assert_eq!(index.len(), 2);
  }

  #[test]
  pub fn validate_flags_duplicate_notes_and_kinds() {
    let mut index = EventIndex::new();
    index.tree.insert(note(10, 2));
    index.tree.insert(note(10, 2));
    assert!(index.validate().is_err());

    let mut index = EventIndex::new();
    index.tree.insert(tempo(10));
    index.tree.insert(tempo(10));
    assert!(index.validate().is_err());

    let index = index_of(&[note(10, 2), note(10, 3), tempo(10), tempo(20)]);
    assert!(index.validate().is_ok());
  }

  #[test]
  pub fn validate_flags_backwards_holds() {
    let mut index = EventIndex::new();
    index.tree.insert(hold(50, 2, 10));
    assert!(index.validate().is_err());
  }

  #[test]
  pub fn random_churn_preserves_order_and_content() {
    // xorshift, deterministic.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
      state ^= state << 13;
      state ^= state >> 7;
      state ^= state << 17;
      state
    };

    let mut pool = Vec::new();
    for row in 0..50u32 {
      for lane in 0..4u8 {
        pool.push(note(row * 12, lane));
      }
    }
    for i in (1..pool.len()).rev() {
      pool.swap(i, (next() as usize) % (i + 1));
    }

    let mut index = EventIndex::new();
    let inserted = &pool[..150];
    for event in inserted {
      index.insert(event.clone());
    }
    for event in &inserted[..70] {
      assert!(index.remove(event).is_some());
    }
    let mut expected: Vec<_> = inserted[70..].to_vec();
    expected.sort_by(|a, b| super::order(a, b));
    let actual: Vec<_> = index.iter().map(|e| e.id()).collect();
    let expected: Vec<_> = expected.iter().map(|e| e.id()).collect();
    assert_eq!(actual, expected);
    assert!(index.validate().is_ok());
  }
}
