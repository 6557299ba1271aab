/// Account whose packages or repositories are being pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The account the token belongs to.
    Authenticated(String),
    /// Another user or organization, named with `--user`.
    User(String),
}

impl Owner {
    pub fn login(&self) -> &str {
        match self {
            Self::Authenticated(login) | Self::User(login) => login,
        }
    }

    /// Path prefix of the owner's package endpoints.
    pub fn api_prefix(&self) -> String {
        match self {
            Self::Authenticated(_) => "user".to_string(),
            Self::User(user) => format!("users/{}", super::encode_segment(user)),
        }
    }

    /// Registry namespace of a package; GHCR only accepts lower case.
    pub fn repository(&self, package: &str) -> String {
        format!("{}/{}", self.login(), package).to_lowercase()
    }
}
