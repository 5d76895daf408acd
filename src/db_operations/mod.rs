// db_operations module

mod core;
mod query;

pub use core::DbOperations;
