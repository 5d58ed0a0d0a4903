// src/portal/mod.rs
pub mod client;
pub mod models;
pub mod portal_error;

pub use client::PortalClient;
pub use portal_error::PortalError;
