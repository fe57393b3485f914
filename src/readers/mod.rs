pub mod stacked_reader;
pub mod table_reader;

pub use stacked_reader::{StackedReader, StackedTables};
pub use table_reader::{TableReader, TableSource};
