pub mod interval_tree;
pub mod ordered_tree;

pub use self::interval_tree::Interval;
pub use self::interval_tree::IntervalCursor;
pub use self::interval_tree::IntervalTree;
pub use self::ordered_tree::Cursor;
pub use self::ordered_tree::OrderedTree;
