pub mod gas_analyzer;

pub use gas_analyzer::{GasAnalyzer, GasStatistics, SdgStatistics, ValueStats};
