//! Client for the GitHub packages and actions REST endpoints.

use chrono::SecondsFormat;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{
    StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    config::Configuration,
    error::{PruneError, Result},
    retention::Cutoff,
    types::{Package, Version, WorkflowRun, WorkflowRunPage},
};

mod owner;

pub use owner::Owner;

/// Characters left alone when a package name is placed in a URL path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const ACCEPT: &str = "application/vnd.github+json";

/// Result of a delete call that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Forbidden,
    /// The delete answered 404 but the object can still be read, which is how
    /// the API reports a missing delete permission.
    MaskedNotFound,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

pub struct PackageClient {
    client: reqwest::Client,
    api_url: String,
    page_size: u32,
}

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

impl PackageClient {
    pub fn new(config: &Configuration) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("token {}", config.token()))
            .map_err(|_| PruneError::Config("token contains invalid characters".into()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            page_size: config.page_size,
        })
    }

    /// Uses `user` when given, otherwise the login owning the token.
    pub async fn resolve_owner(&self, user: Option<&str>) -> Result<Owner> {
        if let Some(user) = user {
            return Ok(Owner::User(user.to_string()));
        }

        let url = format!("{}/user", self.api_url);
        let login: Login = self
            .fetch(&url, &[])
            .await?
            .ok_or_else(|| PruneError::Http {
                url: url.clone(),
                status: StatusCode::NOT_FOUND,
            })?;

        debug!("Authenticated as {}", login.login);

        Ok(Owner::Authenticated(login.login))
    }

    /// Names of all container packages of `owner`, sorted.
    pub async fn list_container_packages(&self, owner: &Owner) -> Result<Vec<String>> {
        let url = format!("{}/{}/packages", self.api_url, owner.api_prefix());
        let query = [("package_type", "container".to_string())];

        let packages: Vec<Package> = self
            .fetch_pages(&url, &query, |page: Vec<Package>| page)
            .await?
            .ok_or_else(|| PruneError::Http {
                url: url.clone(),
                status: StatusCode::NOT_FOUND,
            })?;

        let mut names: Vec<String> = packages.into_iter().map(|p| p.name).collect();
        names.sort();
        Ok(names)
    }

    pub async fn list_versions(&self, owner: &Owner, package: &str) -> Result<Vec<Version>> {
        let url = self.versions_url(owner, package);

        self.fetch_pages(&url, &[], |page: Vec<Version>| page)
            .await?
            .ok_or_else(|| PruneError::UnknownPackage(package.to_string()))
    }

    pub async fn delete_version(
        &self,
        owner: &Owner,
        package: &str,
        version: &Version,
    ) -> Result<DeleteOutcome> {
        let url = format!("{}/{}", self.versions_url(owner, package), version.id);
        self.delete(url).await
    }

    /// Runs of `repository` created before the cutoff, all pages merged.
    pub async fn list_workflow_runs(
        &self,
        owner: &str,
        repository: &str,
        cutoff: Cutoff,
    ) -> Result<Vec<WorkflowRun>> {
        let url = self.runs_url(owner, repository);
        let created = format!(
            "<{}",
            cutoff
                .instant()
                .to_rfc3339_opts(SecondsFormat::Secs, false)
        );

        self.fetch_pages(
            &url,
            &[("created", created)],
            |page: WorkflowRunPage| page.workflow_runs,
        )
        .await?
        .ok_or_else(|| PruneError::UnknownRepository(format!("{owner}/{repository}")))
    }

    pub async fn delete_workflow_run(
        &self,
        owner: &str,
        repository: &str,
        run: &WorkflowRun,
    ) -> Result<DeleteOutcome> {
        let url = format!("{}/{}", self.runs_url(owner, repository), run.id);
        self.delete(url).await
    }

    fn versions_url(&self, owner: &Owner, package: &str) -> String {
        format!(
            "{}/{}/packages/container/{}/versions",
            self.api_url,
            owner.api_prefix(),
            encode_segment(package)
        )
    }

    fn runs_url(&self, owner: &str, repository: &str) -> String {
        format!(
            "{}/repos/{}/{}/actions/runs",
            self.api_url,
            encode_segment(owner),
            encode_segment(repository)
        )
    }

    /// GET returning `None` on 404.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        debug!("GET {url} {query:?}");

        let response = self.client.get(url).query(query).send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Ok(None),
            status => {
                return Err(PruneError::Http {
                    url: url.to_string(),
                    status,
                });
            }
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|err| PruneError::malformed(url, err))
    }

    /// Follows `page` until a short page comes back. `None` when the first
    /// page is a 404.
    async fn fetch_pages<P, T, F>(
        &self,
        url: &str,
        query: &[(&str, String)],
        items: F,
    ) -> Result<Option<Vec<T>>>
    where
        P: DeserializeOwned,
        F: Fn(P) -> Vec<T>,
    {
        let mut all = Vec::new();

        for page in 1.. {
            let mut paged = query.to_vec();
            paged.push(("per_page", self.page_size.to_string()));
            paged.push(("page", page.to_string()));

            let Some(body) = self.fetch::<P>(url, &paged).await? else {
                if page == 1 {
                    return Ok(None);
                }
                break;
            };

            let batch = items(body);
            let done = batch.len() < self.page_size as usize;
            all.extend(batch);

            if done {
                break;
            }
        }

        Ok(Some(all))
    }

    async fn delete(&self, url: String) -> Result<DeleteOutcome> {
        let response = self.client.delete(&url).send().await?;

        match response.status() {
            status if status.is_success() => {
                info!("Deleted {url}");
                Ok(DeleteOutcome::Deleted)
            }
            StatusCode::FORBIDDEN => Ok(DeleteOutcome::Forbidden),
            StatusCode::NOT_FOUND => {
                let probe = self.client.get(&url).send().await?;
                if probe.status().is_success() {
                    Ok(DeleteOutcome::MaskedNotFound)
                } else {
                    Err(PruneError::Http {
                        url,
                        status: StatusCode::NOT_FOUND,
                    })
                }
            }
            status => Err(PruneError::Http { url, status }),
        }
    }
}
