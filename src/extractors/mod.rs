// src/extractors/mod.rs
pub mod directory;
pub mod report_index;
pub mod table;

// Re-export key extraction functions for convenience
pub use directory::parse_companies;
pub use report_index::parse_report_index;
pub use table::extract_values;
