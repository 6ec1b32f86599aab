pub type Seconds = f64;

/// Rows per quarter note. Rows are the finest musical subdivision the chart
/// addresses, so every supported snap (1/4 .. 1/192) lands on a whole row.
pub const ROWS_PER_BEAT: u32 = 48;
pub const ROWS_PER_MEASURE: u32 = ROWS_PER_BEAT * 4;

/// One location in a chart, addressed on both axes at once: the musical row
/// (fractional while scrolling between rows) and the chart time in seconds
/// that the rate-altering timeline assigns to that row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPosition {
  pub row: f64,
  pub seconds: Seconds,
}

impl ChartPosition {
  pub fn new(row: f64, seconds: Seconds) -> ChartPosition {
    ChartPosition { row, seconds }
  }

  pub fn zero() -> ChartPosition {
    ChartPosition {
      row: 0.0,
      seconds: 0.0,
    }
  }
}

#[cfg(test)]
mod test {

  use super::{ChartPosition, ROWS_PER_BEAT, ROWS_PER_MEASURE};

  #[test]
  pub fn new() {
    let position = ChartPosition::new(96.0, 1.0);
    assert_eq!(position.row, 96.0);
    assert_eq!(position.seconds, 1.0);
  }

  #[test]
  pub fn zero() {
    let position = ChartPosition::zero();
    assert_eq!(position.row, 0.0);
    assert_eq!(position.seconds, 0.0);
  }

  #[test]
  pub fn measure_is_four_beats() {
    assert_eq!(ROWS_PER_MEASURE, ROWS_PER_BEAT * 4);
  }
}
