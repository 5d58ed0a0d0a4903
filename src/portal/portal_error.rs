// src/portal/portal_error.rs
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum PortalError {
    Network(String),
    Status(u16),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Network(msg) => write!(f, "Network error: {msg}"),
            PortalError::Status(code) => write!(f, "Unexpected HTTP status: {code}"),
        }
    }
}

impl Error for PortalError {}
