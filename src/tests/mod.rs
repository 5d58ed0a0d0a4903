mod address_tests;
mod config_tests;
mod export_tests;
mod store_tests;

pub mod utils;
