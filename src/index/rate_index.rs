//! Index over the events that alter the row/time mapping (tempos, stops,
//! delays, warps, scroll factors). A specialization of the primary index:
//! the chart keeps it in lockstep so timeline recomputation and rendering
//! can find the governing rate event without scanning past notes.

use std::rc::Rc;

use crate::chart::event::{event_order, Event, EventKindId};
use crate::config::SpacingMode;
use crate::index::event_index::{row_probe, time_probe, EventIndex, ValidationError};
use crate::index::search;
use crate::time::{ChartPosition, Seconds};

pub struct RateAlteringEventIndex {
  index: EventIndex,
}

impl RateAlteringEventIndex {
  pub fn new() -> RateAlteringEventIndex {
    RateAlteringEventIndex {
      index: EventIndex::new(),
    }
  }

  pub fn len(&self) -> usize {
    self.index.len()
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }

  pub fn insert(&mut self, event: Rc<Event>) {
    debug_assert!(event.is_rate_altering(), "event does not alter the rate");
    self.index.insert(event);
  }

  pub fn remove(&mut self, event: &Event) -> Option<Rc<Event>> {
    self.index.remove(event)
  }

  pub fn clear(&mut self) {
    self.index.clear();
  }

  pub fn rebuild(&mut self) {
    self.index.rebuild();
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    self.index.validate()
  }

  /// The rate event governing `event`: the greatest one strictly preceding
  /// it in index order. Before the first rate event the first one governs,
  /// since its settings extend back to the start of the chart.
  pub fn find_active_rate_altering_event(&self, event: &Event) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.index.tree, |e: &Rc<Event>| event_order(e, event), false)
      .cloned()
      .or_else(|| self.index.first_event())
  }

  /// The rate event governing `row`. `allow_equal` decides whether an event
  /// exactly at the row already governs it.
  pub fn find_active_for_position(&self, row: f64, allow_equal: bool) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.index.tree, row_probe(row), allow_equal)
      .cloned()
      .or_else(|| self.index.first_event())
  }

  /// Time-axis counterpart of `find_active_for_position`.
  pub fn find_active_for_time(&self, seconds: Seconds, allow_equal: bool) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.index.tree, time_probe(seconds), allow_equal)
      .cloned()
      .or_else(|| self.index.first_event())
  }

  /// The rate event a display anchored at `position` should snap to. Which
  /// axis decides follows the spacing mode: constant-time displays place
  /// events by seconds, the others by row.
  pub fn find_best(&self, position: &ChartPosition, mode: SpacingMode) -> Option<Rc<Event>> {
    match mode {
      SpacingMode::ConstantTime => self.find_active_for_time(position.seconds, true),
      SpacingMode::ConstantRow | SpacingMode::Variable => {
        self.find_active_for_position(position.row, true)
      }
    }
  }

  /// The rate event of `kind` sitting exactly at `row`, if any.
  pub fn find_event_of_kind_at_row(&self, row: u32, kind: EventKindId) -> Option<Rc<Event>> {
    self
      .index
      .find_events_at_row(row)
      .into_iter()
      .find(|e| e.kind_id() == kind)
  }
}

impl Default for RateAlteringEventIndex {
  fn default() -> RateAlteringEventIndex {
    RateAlteringEventIndex::new()
  }
}
