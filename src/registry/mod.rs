mod client;
pub mod manifest;
mod resolver;

pub use client::{Credential, RegistryClient};
pub use manifest::{Descriptor, ManifestDocument};
pub use resolver::{ManifestDigestResolver, RepositoryResolver};
