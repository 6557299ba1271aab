use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::error::{PruneError, Result};

pub const TOKEN_ENV: &str = "GH_TOKEN";

/// Access token for the GitHub API and registry token exchange.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub api_url: String,
    pub registry_url: String,
    pub registry_service: String,
    pub user_agent: String,
    pub page_size: u32,
    pub token: Option<Token>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            registry_url: "https://ghcr.io".into(),
            registry_service: "ghcr.io".into(),
            user_agent: concat!("ghcr-prune/", env!("CARGO_PKG_VERSION")).into(),
            page_size: 100,
            token: None,
        }
    }
}

impl Configuration {
    pub fn figment(configs: Vec<PathBuf>) -> Figment {
        let fig = Figment::from(Serialized::defaults(Configuration::default()));

        let fig = match AppDirs::new(Some("ghcr-prune"), true) {
            Some(app_dirs) => {
                let config_path = app_dirs.config_dir.join("config.yaml");
                match config_path.exists() {
                    true => fig.admerge(Yaml::file(config_path)),
                    false => fig,
                }
            }
            None => fig,
        };

        let fig = configs
            .into_iter()
            .fold(fig, |fig, config_path| fig.admerge(Yaml::file(config_path)));

        fig.merge(Env::prefixed("GHCR_PRUNE_"))
            .merge(Env::raw().only(&[TOKEN_ENV]).map(|_| "token".into()))
    }

    pub fn config(figment: Figment) -> Result<Configuration> {
        let mut config: Configuration = figment
            .extract()
            .map_err(|err| PruneError::Config(err.to_string()))?;

        match &config.token {
            Some(token) if !token.expose().is_empty() => {}
            _ => {
                return Err(PruneError::Config(format!(
                    "missing authentication token ({TOKEN_ENV})"
                )));
            }
        }

        if config.page_size == 0 || config.page_size > 100 {
            return Err(PruneError::Config(
                "page_size must be between 1 and 100".into(),
            ));
        }

        for url in [&mut config.api_url, &mut config.registry_url] {
            reqwest::Url::parse(url.as_str())
                .map_err(|err| PruneError::Config(format!("invalid url {url}: {err}")))?;
            while url.ends_with('/') {
                url.pop();
            }
        }

        Ok(config)
    }

    pub fn token(&self) -> &str {
        self.token.as_ref().map(Token::expose).unwrap_or_default()
    }
}
