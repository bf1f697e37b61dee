pub mod cache;
pub mod classify;
pub mod rdap;
pub mod record;
pub mod registry;
pub mod reverse;

// Re-export main types and functions
pub use cache::{NetworkCache, NetworkInfo};
pub use classify::{Classification, classify};
pub use rdap::RdapClient;
pub use record::ResolvedRecord;
pub use registry::{RegistryClient, RegistryResponse};
pub use reverse::{ReverseResolver, SystemReverseResolver};
