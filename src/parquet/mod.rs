//! Handles serialising and saving data to disk in the _parquet_ file format.

pub mod catalog;

pub use catalog::save_catalog;
