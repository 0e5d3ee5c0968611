#[macro_use]
pub mod macros;

pub mod api;
pub mod config;
pub mod data_collector;
pub mod fs_util;
pub mod parser;
pub mod schema;
pub mod writer;
