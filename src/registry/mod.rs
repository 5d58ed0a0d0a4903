// src/registry/mod.rs
pub mod client;
pub mod models;
pub mod registry_error;

pub use client::RegistryClient;
pub use registry_error::RegistryError;

use models::{PersonDetails, RegistryHit};

/// Person-registry lookup boundary. The production client handles session
/// tokens and retries internally; callers only see hits or failure.
pub trait PersonRegistry {
    /// `None` signals unrecoverable failure after the client's own retry.
    /// An empty vec is a successful search with no hits.
    fn search(&mut self, query: &str) -> Option<Vec<RegistryHit>>;

    /// Best-effort supplementary attributes; failures yield the defaults.
    fn fetch_detail(&mut self, hit_id: &str) -> PersonDetails;
}

impl<R: PersonRegistry + ?Sized> PersonRegistry for &mut R {
    fn search(&mut self, query: &str) -> Option<Vec<RegistryHit>> {
        (**self).search(query)
    }

    fn fetch_detail(&mut self, hit_id: &str) -> PersonDetails {
        (**self).fetch_detail(hit_id)
    }
}
