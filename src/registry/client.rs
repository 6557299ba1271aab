use reqwest::{StatusCode, header};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::{Configuration, Token},
    error::{PruneError, Result},
    registry::manifest::{ACCEPTED_MEDIA_TYPES, ManifestDocument, parse_manifest},
};

/// Short-lived bearer token scoped to pulling a single repository.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    fn header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(alias = "access_token")]
    token: String,
}

/// Read-only client for an OCI distribution registry.
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    service: String,
    token: Token,
}

impl RegistryClient {
    pub fn new(config: &Configuration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.registry_url.clone(),
            service: config.registry_service.clone(),
            token: Token::new(config.token()),
        })
    }

    /// Exchanges the long-lived access token for a pull token on `repository`.
    pub async fn authenticate(&self, repository: &str) -> Result<Credential> {
        let url = format!("{}/token", self.base_url);
        let scope = format!("repository:{repository}:pull");

        debug!("Mint: Requesting pull token for {repository}");

        let response = self
            .client
            .get(&url)
            .basic_auth("user", Some(self.token.expose()))
            .query(&[("scope", scope.as_str()), ("service", self.service.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Mint: Failed to mint pull token for {repository}: {status}");
            return Err(PruneError::Auth {
                repository: repository.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        let payload: TokenResponse =
            serde_json::from_slice(&body).map_err(|err| PruneError::malformed(&url, err))?;

        Ok(Credential(payload.token))
    }

    /// Fetches a manifest or manifest list by tag or digest.
    pub async fn get_manifest(
        &self,
        credential: &Credential,
        repository: &str,
        reference: &str,
    ) -> Result<ManifestDocument> {
        let url = format!("{}/v2/{repository}/manifests/{reference}", self.base_url);

        debug!("Fetching manifest {url}");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, credential.header())
            .header(header::ACCEPT, ACCEPTED_MEDIA_TYPES.join(","))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(PruneError::NotFound {
                    repository: repository.to_string(),
                    reference: reference.to_string(),
                });
            }
            status => return Err(PruneError::Registry { url, status }),
        }

        let body = response.bytes().await?;
        parse_manifest(&body).map_err(|err| PruneError::malformed(&url, err))
    }
}
