//! Index over duration events, keyed by their row span. Answers "which
//! holds cover this row" without walking the primary index backward, which
//! is what the renderer asks on every frame for the visible region.

use std::rc::Rc;

use log::trace;

use crate::chart::event::Event;
use crate::collections::interval_tree::{Interval, IntervalTree};
use crate::index::search;

pub struct IntervalIndex {
  tree: IntervalTree<Rc<Event>>,
}

impl IntervalIndex {
  pub fn new() -> IntervalIndex {
    IntervalIndex {
      tree: IntervalTree::new(),
    }
  }

  pub fn len(&self) -> usize {
    self.tree.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tree.is_empty()
  }

  /// Inserts a duration event under its `[row, end_row]` span. Events
  /// without a duration have no span to index and are refused.
  pub fn insert(&mut self, event: Rc<Event>) -> bool {
    let end_row = match event.end_row() {
      Some(end_row) => end_row,
      None => return false,
    };
    trace!("interval insert rows {}..={}", event.row(), end_row);
    let interval = Interval::new(f64::from(event.row()), f64::from(end_row));
    self.tree.insert(interval, event);
    true
  }

  pub fn remove(&mut self, event: &Event) -> Option<Rc<Event>> {
    let end_row = event.end_row()?;
    let interval = Interval::new(f64::from(event.row()), f64::from(end_row));
    let id = event.id();
    self.tree.remove_by(interval, |e| e.id() == id)
  }

  pub fn clear(&mut self) {
    self.tree.clear();
  }

  /// All duration events whose span covers `row`, in start-row order.
  pub fn find_overlapping(&self, row: f64) -> Vec<Rc<Event>> {
    self.tree.find_overlapping(row).into_iter().cloned().collect()
  }

  /// The duration event nearest `row` by start row, preferring the greatest
  /// one starting at or before it.
  pub fn find_best_by_position(&self, row: f64) -> Option<Rc<Event>> {
    search::interval_greatest_preceding(&self.tree, row, true)
      .cloned()
      .or_else(|| self.tree.first().current().cloned())
  }

  /// The duration event starting strictly before `row`, wrapping to the
  /// last one.
  pub fn find_previous_with_looping(&self, row: f64) -> Option<Rc<Event>> {
    search::interval_greatest_preceding(&self.tree, row, false)
      .cloned()
      .or_else(|| self.tree.last().current().cloned())
  }

  /// The duration event starting strictly after `row`, wrapping to the
  /// first one.
  pub fn find_next_with_looping(&self, row: f64) -> Option<Rc<Event>> {
    search::interval_least_following(&self.tree, row, false)
      .cloned()
      .or_else(|| self.tree.first().current().cloned())
  }
}

impl Default for IntervalIndex {
  fn default() -> IntervalIndex {
    IntervalIndex::new()
  }
}
