//! Index over interpolated scroll-rate segments, with evaluation. Each
//! segment starts at its event and ramps the effective scroll rate from a
//! start to an end value over a period measured in rows or in seconds.

use std::rc::Rc;

use crate::chart::event::{Event, EventKind, EventKindId, RateSegment};
use crate::index::event_index::{row_probe, EventIndex, ValidationError};
use crate::index::search;
use crate::time::ChartPosition;

pub struct InterpolatedRateIndex {
  index: EventIndex,
  default_rate: f64,
}

impl InterpolatedRateIndex {
  pub fn new(default_rate: f64) -> InterpolatedRateIndex {
    InterpolatedRateIndex {
      index: EventIndex::new(),
      default_rate,
    }
  }

  pub fn len(&self) -> usize {
    self.index.len()
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }

  pub fn default_rate(&self) -> f64 {
    self.default_rate
  }

  pub fn insert(&mut self, event: Rc<Event>) {
    debug_assert!(
      event.kind_id() == EventKindId::InterpolatedScrollRate,
      "event carries no rate segment"
    );
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

  /// The segment governing `position`: the greatest one starting at or
  /// before its row, else the first segment, whose ramp extends back to the
  /// start of the chart.
  pub fn find_active_segment(&self, position: &ChartPosition) -> Option<Rc<Event>> {
    search::greatest_preceding(&self.index.tree, row_probe(position.row), true)
      .cloned()
      .or_else(|| self.index.first_event())
  }

  /// The effective scroll rate at `position`. Outside every segment this is
  /// the configured default; inside one it is the segment's ramp clamped to
  /// its endpoints, so positions before the first segment read its start
  /// rate and positions past a segment's period read its end rate.
  pub fn find_scroll_rate(&self, position: &ChartPosition) -> f64 {
    let event = match self.find_active_segment(position) {
      Some(event) => event,
      None => return self.default_rate,
    };
    match event.kind() {
      EventKind::InterpolatedScrollRate(segment) => evaluate(&event, segment, position),
      _ => self.default_rate,
    }
  }
}

fn evaluate(event: &Event, segment: &RateSegment, position: &ChartPosition) -> f64 {
  let t = if segment.prefer_time {
    let elapsed = position.seconds - event.seconds();
    if segment.period_seconds > 0.0 {
      elapsed / segment.period_seconds
    } else if elapsed < 0.0 {
      0.0
    } else {
      // A zero period is a step straight to the end rate.
      1.0
    }
  } else {
    let elapsed = position.row - f64::from(event.row());
    if segment.period_rows > 0 {
      elapsed / f64::from(segment.period_rows)
    } else if elapsed < 0.0 {
      0.0
    } else {
      1.0
    }
  };
  let t = t.max(0.0).min(1.0);
  segment.start_rate + (segment.end_rate - segment.start_rate) * t
}
