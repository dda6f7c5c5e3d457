pub mod predicate;
pub mod table_cursor;

pub use predicate::{CompareOp, Condition, Predicate, RowSource, TruePredicate};
pub use table_cursor::{CursorState, TableCursor};
