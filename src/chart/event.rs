use std::cell::Cell;
use std::cmp::Ordering;

use uuid::Uuid;

use crate::time::Seconds;

pub type EventId = Uuid;
pub type Lane = u8;

/// Kind discriminator, separated from the payload so indexes can classify
/// and tie-break without touching payload data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKindId {
  TimeSignature,
  Tempo,
  ScrollRate,
  InterpolatedScrollRate,
  Warp,
  Stop,
  Delay,
  TickCount,
  Label,
  Pattern,
  Note,
}

impl EventKindId {
  /// Explicit same-row ordering. When several events share a row, the one
  /// with the lower priority sorts first and therefore applies first.
  /// Warps precede stops and delays so a warp landing on a stopped row is
  /// the event in force there, and notes sort strictly last so every state
  /// change at a row precedes the notes it affects.
  pub fn sort_priority(self) -> u8 {
    match self {
      EventKindId::TimeSignature => 0,
      EventKindId::Tempo => 1,
      EventKindId::ScrollRate => 2,
      EventKindId::InterpolatedScrollRate => 3,
      EventKindId::Warp => 4,
      EventKindId::Stop => 5,
      EventKindId::Delay => 6,
      EventKindId::TickCount => 7,
      EventKindId::Label => 8,
      EventKindId::Pattern => 9,
      EventKindId::Note => 10,
    }
  }

  /// Whether events of this kind alter the row/time mapping.
  pub fn is_rate_altering(self) -> bool {
    match self {
      EventKindId::Tempo
      | EventKindId::Stop
      | EventKindId::Delay
      | EventKindId::Warp
      | EventKindId::ScrollRate => true,
      _ => false,
    }
  }
}

/// One scroll-rate interpolation segment: starting at the owning event's
/// row/time, the effective rate moves from `start_rate` to `end_rate` over
/// `period_rows` rows or `period_seconds` seconds, whichever axis the
/// segment prefers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSegment {
  pub start_rate: f64,
  pub end_rate: f64,
  pub period_rows: u32,
  pub period_seconds: Seconds,
  pub prefer_time: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
  TimeSignature { num_beats: u8, note_value: u8 },
  Tempo { bpm: f64 },
  ScrollRate { factor: f64 },
  InterpolatedScrollRate(RateSegment),
  Warp { rows: u32 },
  Stop { seconds: Seconds },
  Delay { seconds: Seconds },
  TickCount { ticks: u32 },
  Label { text: String },
  Pattern { length_rows: u32 },
  Note { lane: Lane, end_row: Option<u32> },
}

impl EventKind {
  pub fn id(&self) -> EventKindId {
    match self {
      EventKind::TimeSignature { .. } => EventKindId::TimeSignature,
      EventKind::Tempo { .. } => EventKindId::Tempo,
      EventKind::ScrollRate { .. } => EventKindId::ScrollRate,
      EventKind::InterpolatedScrollRate(_) => EventKindId::InterpolatedScrollRate,
      EventKind::Warp { .. } => EventKindId::Warp,
      EventKind::Stop { .. } => EventKindId::Stop,
      EventKind::Delay { .. } => EventKindId::Delay,
      EventKind::TickCount { .. } => EventKindId::TickCount,
      EventKind::Label { .. } => EventKindId::Label,
      EventKind::Pattern { .. } => EventKindId::Pattern,
      EventKind::Note { .. } => EventKindId::Note,
    }
  }
}

/// One timed chart event. The chart's backing collection owns events (as
/// `Rc` shared with the indexes); the indexes never create or destroy them.
///
/// The row is fixed at creation — moving an event is a remove plus a fresh
/// insert, so the trees never hold a key that changed under them. The chart
/// time is a cell because it is derived state: the rate-altering timeline
/// restamps it whenever a rate event changes.
#[derive(Debug)]
pub struct Event {
  id: EventId,
  row: u32,
  seconds: Cell<Seconds>,
  kind: EventKind,
  being_edited: Cell<bool>,
}

impl Event {
  pub fn new(row: u32, kind: EventKind) -> Event {
    Event {
      id: Uuid::new_v4(),
      row,
      seconds: Cell::new(0.0),
      kind,
      being_edited: Cell::new(false),
    }
  }

  pub fn id(&self) -> EventId {
    self.id
  }

  pub fn row(&self) -> u32 {
    self.row
  }

  pub fn seconds(&self) -> Seconds {
    self.seconds.get()
  }

  pub fn set_seconds(&self, seconds: Seconds) {
    self.seconds.set(seconds);
  }

  pub fn kind(&self) -> &EventKind {
    &self.kind
  }

  pub fn kind_id(&self) -> EventKindId {
    self.kind.id()
  }

  pub fn lane(&self) -> Option<Lane> {
    match self.kind {
      EventKind::Note { lane, .. } => Some(lane),
      _ => None,
    }
  }

  /// End row for duration events (holds); `None` for instantaneous events.
  pub fn end_row(&self) -> Option<u32> {
    match self.kind {
      EventKind::Note { end_row, .. } => end_row,
      _ => None,
    }
  }

  pub fn is_rate_altering(&self) -> bool {
    self.kind_id().is_rate_altering()
  }

  pub fn is_being_edited(&self) -> bool {
    self.being_edited.get()
  }

  pub fn set_being_edited(&self, editing: bool) {
    self.being_edited.set(editing);
  }
}

/// The total order every index sorts by: row first, then the explicit
/// same-row kind priority, then lane for note events. Within a legal
/// collection (one note per row/lane, one non-lane event per row/kind) no
/// two distinct events compare equal.
pub fn event_order(a: &Event, b: &Event) -> Ordering {
  a.row()
    .cmp(&b.row())
    .then(a.kind_id().sort_priority().cmp(&b.kind_id().sort_priority()))
    .then_with(|| match (a.lane(), b.lane()) {
      (Some(a), Some(b)) => a.cmp(&b),
      _ => Ordering::Equal,
    })
}
