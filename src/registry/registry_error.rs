// src/registry/registry_error.rs
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RegistryError {
    Token(String),
    Network(String),
    Status(u16),
    JsonParse(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Token(msg) => write!(f, "Token refresh failed: {msg}"),
            RegistryError::Network(msg) => write!(f, "Network error: {msg}"),
            RegistryError::Status(code) => write!(f, "Unexpected HTTP status: {code}"),
            RegistryError::JsonParse(msg) => write!(f, "JSON parse error: {msg}"),
        }
    }
}

impl Error for RegistryError {}
