pub mod columns;
pub mod gas;
pub mod sample;
pub mod table;

pub use columns::{ConcentrationColumns, SaturationColumns};
pub use gas::{percent_saturation, Gas, HeadspaceInputs};
pub use sample::PhysicalInputs;
pub use table::{Column, ColumnData, Table};
