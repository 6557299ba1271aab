use serde::Deserialize;

/// A package as returned by the package listing endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Package {
    pub name: String,
}
