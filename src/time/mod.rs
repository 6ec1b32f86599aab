pub mod position;

pub use self::position::ChartPosition;
pub use self::position::Seconds;
pub use self::position::ROWS_PER_BEAT;
pub use self::position::ROWS_PER_MEASURE;
