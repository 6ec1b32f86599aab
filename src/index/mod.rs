pub mod event_index;
pub mod interval_index;
pub mod rate_index;
pub mod scroll_rate_index;
pub mod search;

pub use self::event_index::EventIndex;
pub use self::event_index::ValidationError;
pub use self::interval_index::IntervalIndex;
pub use self::rate_index::RateAlteringEventIndex;
pub use self::scroll_rate_index::InterpolatedRateIndex;
