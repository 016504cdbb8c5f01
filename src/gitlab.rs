use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::config::Config;
use crate::error::{LazylabError, Result};
use crate::forge::Forge;
use crate::types::{ListMergeRequestsOptions, MergeRequest};

const API_PATH: &str = "api/v4/";
const USER_AGENT: &str = "lazylab";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct GitLab {
    client: Client,
    base_url: Url,
    token: String,
}

impl GitLab {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = api_base(&config.server)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LazylabError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LazylabError::InvalidServer(self.base_url.to_string(), e.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| LazylabError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(status_error(status, url, text));
        }

        response
            .json()
            .await
            .map_err(|e| LazylabError::Decode(e.to_string()))
    }
}

/// Normalize the configured server into the versioned API root, always
/// ending in `/api/v4/`.
fn api_base(server: &str) -> Result<Url> {
    let mut url = Url::parse(server)
        .map_err(|e| LazylabError::InvalidServer(server.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(LazylabError::InvalidServer(
            server.to_string(),
            "not a base URL".to_string(),
        ));
    }

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    if !path.ends_with(&format!("/{}", API_PATH)) {
        path.push_str(API_PATH);
    }
    url.set_path(&path);
    Ok(url)
}

fn status_error(status: StatusCode, url: String, body: String) -> LazylabError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LazylabError::Auth(format!("GitLab API {}: {}", status, body))
        }
        _ => LazylabError::Status {
            method: "GET".to_string(),
            url,
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl Forge for GitLab {
    fn name(&self) -> &str {
        "GitLab"
    }

    async fn list_merge_requests(
        &self,
        opts: &ListMergeRequestsOptions,
    ) -> Result<Vec<MergeRequest>> {
        let url = self.api_url("merge_requests")?;
        self.get_json(url, &opts.query_pairs()).await
    }
}
