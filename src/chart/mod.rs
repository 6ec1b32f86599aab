pub mod event;

use std::rc::Rc;

use log::{debug, trace};

use crate::config::{Config, SpacingMode};
use crate::index::{EventIndex, IntervalIndex, InterpolatedRateIndex, RateAlteringEventIndex};
use crate::time::{ChartPosition, Seconds, ROWS_PER_BEAT};

use self::event::{Event, EventKindId};

/// Maps rows to chart time. The full timeline (tempo, stop, delay and warp
/// aware) lives with the owning editor; the indexes only need the mapping
/// to stamp events.
pub trait Timing {
  fn seconds_at_row(&self, row: f64) -> Seconds;
}

/// Fixed-tempo timing: chart time grows linearly with rows. Serves charts
/// without rate events, and tests.
pub struct ConstantTempoTiming {
  seconds_per_row: f64,
}

impl ConstantTempoTiming {
  pub fn new(bpm: f64) -> ConstantTempoTiming {
    ConstantTempoTiming {
      seconds_per_row: 60.0 / (bpm * f64::from(ROWS_PER_BEAT)),
    }
  }
}

impl Timing for ConstantTempoTiming {
  fn seconds_at_row(&self, row: f64) -> Seconds {
    row * self.seconds_per_row
  }
}

/// A chart and the indexes kept in lockstep over its events. Every edit
/// goes through here so an event can never be present in one index and
/// missing from another: duration events also live in the hold index, rate
/// events in the rate index, interpolated segments in the segment index.
pub struct Chart {
  name: String,
  events: Vec<Rc<Event>>,
  index: EventIndex,
  holds: IntervalIndex,
  rate_events: RateAlteringEventIndex,
  interpolated_rates: InterpolatedRateIndex,
  spacing_mode: SpacingMode,
}

impl Chart {
  pub fn new<T>(name: T, config: &Config) -> Chart
  where
    T: Into<String>,
  {
    Chart {
      name: name.into(),
      events: Vec::new(),
      index: EventIndex::new(),
      holds: IntervalIndex::new(),
      rate_events: RateAlteringEventIndex::new(),
      interpolated_rates: InterpolatedRateIndex::new(config.editor.default_scroll_rate),
      spacing_mode: config.editor.spacing_mode,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn set_name<T>(&mut self, name: T)
  where
    T: Into<String>,
  {
    self.name = name.into();
  }

  pub fn event_count(&self) -> usize {
    self.events.len()
  }

  pub fn spacing_mode(&self) -> SpacingMode {
    self.spacing_mode
  }

  pub fn set_spacing_mode(&mut self, mode: SpacingMode) {
    self.spacing_mode = mode;
  }

  pub fn index(&self) -> &EventIndex {
    &self.index
  }

  pub fn holds(&self) -> &IntervalIndex {
    &self.holds
  }

  pub fn rate_events(&self) -> &RateAlteringEventIndex {
    &self.rate_events
  }

  pub fn interpolated_rates(&self) -> &InterpolatedRateIndex {
    &self.interpolated_rates
  }

  /// Stamps the event's chart time and inserts it into every index that
  /// tracks its kind. Returns the shared handle the chart keeps.
  pub fn add_event(&mut self, event: Event, timing: &dyn Timing) -> Rc<Event> {
    event.set_seconds(timing.seconds_at_row(f64::from(event.row())));
    let event = Rc::new(event);
    trace!("chart add {:?} at row {}", event.kind_id(), event.row());
    self.index.insert(event.clone());
    if event.end_row().is_some() {
      self.holds.insert(event.clone());
    }
    if event.is_rate_altering() {
      self.rate_events.insert(event.clone());
    }
    if event.kind_id() == EventKindId::InterpolatedScrollRate {
      self.interpolated_rates.insert(event.clone());
    }
    self.events.push(event.clone());
    event
  }

  /// Removes the event from every index holding it. False when the chart
  /// does not know the event.
  pub fn remove_event(&mut self, event: &Event) -> bool {
    let position = match self.events.iter().position(|e| e.id() == event.id()) {
      Some(position) => position,
      None => return false,
    };
    trace!("chart remove {:?} at row {}", event.kind_id(), event.row());
    self.events.remove(position);
    self.index.remove(event);
    if event.end_row().is_some() {
      self.holds.remove(event);
    }
    if event.is_rate_altering() {
      self.rate_events.remove(event);
    }
    if event.kind_id() == EventKindId::InterpolatedScrollRate {
      self.interpolated_rates.remove(event);
    }
    true
  }

  /// Restamps every event's chart time from `timing` and rebuilds the
  /// indexes that answer time-axis queries. Called after a rate event edit
  /// changes the timeline.
  pub fn retime(&mut self, timing: &dyn Timing) {
    debug!("retiming {} events", self.events.len());
    for event in &self.events {
      event.set_seconds(timing.seconds_at_row(f64::from(event.row())));
    }
    self.index.rebuild();
    self.rate_events.rebuild();
    self.interpolated_rates.rebuild();
  }

  /// The rate event a display anchored at `position` snaps to, on the axis
  /// the chart's spacing mode prescribes.
  pub fn find_best_rate_event(&self, position: &ChartPosition) -> Option<Rc<Event>> {
    self.rate_events.find_best(position, self.spacing_mode)
  }

  pub fn find_scroll_rate(&self, position: &ChartPosition) -> f64 {
    self.interpolated_rates.find_scroll_rate(position)
  }
}
