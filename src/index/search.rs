//! Boundary-correction walks over raw tree cursors.
//!
//! The tree's nearest-match primitives promise no particular element of a
//! run of order-equal elements, and duplicate keys are routine here (many
//! events share a row, warped events share a time). These helpers take the
//! raw cursor and correct it in two phases: first walk forward absorbing
//! ties still on the wanted side of the target, then walk backward off
//! anything on the wrong side, leaving the nearest element on the correct
//! side of the requested boundary.

use std::cmp::Ordering;

use crate::collections::interval_tree::{IntervalCursor, IntervalTree};
use crate::collections::ordered_tree::{Cursor, OrderedTree};

fn on_wanted_side(ord: Ordering, inclusive: bool, preceding: bool) -> bool {
  match ord {
    Ordering::Less => preceding,
    Ordering::Equal => inclusive,
    Ordering::Greater => !preceding,
  }
}

/// Cursor on the greatest element ordered (at-or-)before the target, unset
/// when none qualifies. `probe` orders an element against the target.
pub fn greatest_preceding_cursor<'a, T, C, P>(
  tree: &'a OrderedTree<T, C>,
  probe: P,
  inclusive: bool,
) -> Cursor<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
  P: Fn(&T) -> Ordering,
{
  let mut cursor = tree.find_greatest_preceding(&probe, inclusive);
  loop {
    let mut ahead = cursor.clone();
    if !ahead.move_next() {
      break;
    }
    let still_wanted = match ahead.current() {
      Some(value) => on_wanted_side(probe(value), inclusive, true),
      None => false,
    };
    if !still_wanted {
      break;
    }
    cursor = ahead;
  }
  loop {
    match cursor.current() {
      Some(value) => {
        if on_wanted_side(probe(value), inclusive, true) {
          return cursor;
        }
        if !cursor.move_prev() {
          return cursor;
        }
      }
      None => return cursor,
    }
  }
}

/// Cursor on the least element ordered (at-or-)after the target, unset when
/// none qualifies.
pub fn least_following_cursor<'a, T, C, P>(
  tree: &'a OrderedTree<T, C>,
  probe: P,
  inclusive: bool,
) -> Cursor<'a, T, C>
where
  C: Fn(&T, &T) -> Ordering,
  P: Fn(&T) -> Ordering,
{
  let mut cursor = tree.find_least_following(&probe, inclusive);
  loop {
    let mut behind = cursor.clone();
    if !behind.move_prev() {
      break;
    }
    let still_wanted = match behind.current() {
      Some(value) => on_wanted_side(probe(value), inclusive, false),
      None => false,
    };
    if !still_wanted {
      break;
    }
    cursor = behind;
  }
  loop {
    match cursor.current() {
      Some(value) => {
        if on_wanted_side(probe(value), inclusive, false) {
          return cursor;
        }
        if !cursor.move_next() {
          return cursor;
        }
      }
      None => return cursor,
    }
  }
}

pub fn greatest_preceding<'a, T, C, P>(
  tree: &'a OrderedTree<T, C>,
  probe: P,
  inclusive: bool,
) -> Option<&'a T>
where
  C: Fn(&T, &T) -> Ordering,
  P: Fn(&T) -> Ordering,
{
  greatest_preceding_cursor(tree, probe, inclusive).current()
}

pub fn least_following<'a, T, C, P>(
  tree: &'a OrderedTree<T, C>,
  probe: P,
  inclusive: bool,
) -> Option<&'a T>
where
  C: Fn(&T, &T) -> Ordering,
  P: Fn(&T) -> Ordering,
{
  least_following_cursor(tree, probe, inclusive).current()
}

/// Interval-tree analogue keyed by low endpoint.
pub fn interval_greatest_preceding<'a, T>(
  tree: &'a IntervalTree<T>,
  x: f64,
  inclusive: bool,
) -> Option<&'a T> {
  let mut cursor = tree.find_greatest_preceding(x, inclusive);
  loop {
    let mut ahead = cursor.clone();
    if !ahead.move_next() {
      break;
    }
    let still_wanted = match ahead.current_interval() {
      Some(interval) => interval.low < x || (inclusive && interval.low == x),
      None => false,
    };
    if !still_wanted {
      break;
    }
    cursor = ahead;
  }
  correct_interval_backward(cursor, x, inclusive)
}

fn correct_interval_backward<T>(
  mut cursor: IntervalCursor<T>,
  x: f64,
  inclusive: bool,
) -> Option<&T> {
  loop {
    match cursor.current_interval() {
      Some(interval) => {
        if interval.low < x || (inclusive && interval.low == x) {
          return cursor.current();
        }
        if !cursor.move_prev() {
          return None;
        }
      }
      None => return None,
    }
  }
}

/// Interval-tree analogue keyed by low endpoint.
pub fn interval_least_following<'a, T>(
  tree: &'a IntervalTree<T>,
  x: f64,
  inclusive: bool,
) -> Option<&'a T> {
  let mut cursor = tree.find_least_following(x, inclusive);
  loop {
    let mut behind = cursor.clone();
    if !behind.move_prev() {
      break;
    }
    let still_wanted = match behind.current_interval() {
      Some(interval) => interval.low > x || (inclusive && interval.low == x),
      None => false,
    };
    if !still_wanted {
      break;
    }
    cursor = behind;
  }
  loop {
    match cursor.current_interval() {
      Some(interval) => {
        if interval.low > x || (inclusive && interval.low == x) {
          return cursor.current();
        }
        if !cursor.move_next() {
          return None;
        }
      }
      None => return None,
    }
  }
}
