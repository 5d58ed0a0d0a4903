// src/export/mod.rs
pub mod report_xlsx;

pub use report_xlsx::write_report;

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    Io(String),
    Xlsx(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(msg) => write!(f, "IO error: {msg}"),
            ExportError::Xlsx(msg) => write!(f, "Xlsx error: {msg}"),
        }
    }
}

impl Error for ExportError {}
