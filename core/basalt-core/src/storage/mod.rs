//! The column-store core: values, columns, indexes, tables.

pub mod btree;
pub mod column;
pub mod index;
pub mod sorted;
pub mod table;
pub mod value;

pub use btree::BPlusTree;
pub use column::Column;
pub use index::{ColumnIndex, IndexData, IndexKind};
pub use sorted::SortedIndex;
pub use table::{Database, Table};
pub use value::{Value, ValueType};
