use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};

use crate::{
    api::{
        Comment, CommentEdit, CommentId, Error as ApiError, NewComment, ThreadId, Uuid,
        ViewerId, VoteStatus,
    },
    CommentService, Error,
};

pub const HOST_ENV: &str = "FOUNDRY_HOST";
pub const VIEWER_ENV: &str = "FOUNDRY_VIEWER";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base url of the comment service, eg. `https://example.org`
    pub host: String,

    /// Viewer on whose behalf requests are made
    pub viewer: ViewerId,

    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, viewer: ViewerId) -> ClientConfig {
        ClientConfig {
            host: host.into(),
            viewer,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ClientConfig {
        self.timeout = timeout;
        self
    }

    /// Reads the host from FOUNDRY_HOST and the viewer from FOUNDRY_VIEWER
    pub fn from_env() -> anyhow::Result<ClientConfig> {
        let host = std::env::var(HOST_ENV)
            .with_context(|| format!("retrieving {HOST_ENV} environment variable"))?;
        Ok(ClientConfig::new(host, viewer_from_env()?))
    }
}

pub fn viewer_from_env() -> anyhow::Result<ViewerId> {
    let viewer = std::env::var(VIEWER_ENV)
        .with_context(|| format!("retrieving {VIEWER_ENV} environment variable"))?;
    let viewer = Uuid::try_parse(&viewer)
        .with_context(|| format!("parsing {VIEWER_ENV} as a viewer id"))?;
    Ok(ViewerId(viewer))
}

/// Comment service reached over HTTP, with JSON bodies
#[derive(Clone, Debug)]
pub struct HttpCommentService {
    client: reqwest::Client,
    base: Url,
    viewer: ViewerId,
}

impl HttpCommentService {
    pub fn new(config: ClientConfig) -> anyhow::Result<HttpCommentService> {
        let base = Url::parse(&config.host)
            .with_context(|| format!("parsing comment service host {:?}", config.host))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("comment service host {:?} is not a base url", config.host));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("building http client")?;
        Ok(HttpCommentService {
            client,
            base,
            viewer: config.viewer,
        })
    }

    pub fn viewer(&self) -> ViewerId {
        self.viewer
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("checked base url at construction")
            .pop_if_empty()
            .push("api")
            .extend(segments);
        url
    }

    async fn send(&self, req: RequestBuilder) -> Result<Vec<u8>, Error> {
        let resp = req.bearer_auth(self.viewer.0).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if status.is_success() {
            return Ok(body.to_vec());
        }
        match ApiError::parse(&body) {
            Ok(err) => Err(Error::Api(err)),
            Err(err) => Err(Error::Protocol(
                err.context(format!("reading error answer with status {status}")),
            )),
        }
    }

    async fn send_json<R>(&self, req: RequestBuilder) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let body = self.send(req).await?;
        serde_json::from_slice(&body)
            .context("parsing answer body")
            .map_err(Error::Protocol)
    }
}

#[async_trait]
impl CommentService for HttpCommentService {
    async fn fetch_thread(&self, thread: &ThreadId) -> Result<Vec<Comment>, Error> {
        let url = self.endpoint(&["threads", thread.as_str(), "comments"]);
        self.send_json(self.client.get(url)).await
    }

    async fn create_comment(&self, thread: &ThreadId, c: NewComment) -> Result<Comment, Error> {
        let url = self.endpoint(&["threads", thread.as_str(), "comments"]);
        self.send_json(self.client.post(url).json(&c)).await
    }

    async fn update_comment(&self, id: CommentId, edit: CommentEdit) -> Result<Comment, Error> {
        let id = id.to_string();
        let url = self.endpoint(&["comments", &id]);
        self.send_json(self.client.put(url).json(&edit)).await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.endpoint(&["comments", &id]);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn toggle_upvote(&self, id: CommentId) -> Result<VoteStatus, Error> {
        let id = id.to_string();
        let url = self.endpoint(&["comments", &id, "upvote"]);
        self.send_json(self.client.post(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(host: &str) -> HttpCommentService {
        HttpCommentService::new(ClientConfig::new(host, ViewerId::stub()))
            .expect("building http service")
    }

    #[test]
    fn endpoints_are_built_under_api() {
        let id = CommentId::stub().to_string();
        assert_eq!(
            service("http://localhost:3000")
                .endpoint(&["comments", &id, "upvote"])
                .as_str(),
            "http://localhost:3000/api/comments/ffffffff-ffff-ffff-ffff-ffffffffffff/upvote"
        );
        assert_eq!(
            service("https://example.org/forum/")
                .endpoint(&["threads", "problem-1", "comments"])
                .as_str(),
            "https://example.org/forum/api/threads/problem-1/comments"
        );
    }

    #[test]
    fn thread_ids_are_escaped() {
        assert_eq!(
            service("http://localhost:3000")
                .endpoint(&["threads", "a/b c", "comments"])
                .as_str(),
            "http://localhost:3000/api/threads/a%2Fb%20c/comments"
        );
    }

    #[test]
    fn bad_hosts_are_refused() {
        for host in ["not a url", "mailto:a@b.c"] {
            let config = ClientConfig::new(host, ViewerId::stub());
            assert!(HttpCommentService::new(config).is_err(), "{host} was accepted");
        }
    }

    #[test]
    fn config_builder() {
        let config = ClientConfig::new("http://localhost:3000", ViewerId::stub())
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.viewer, ViewerId::stub());
        assert_eq!(
            ClientConfig::new("http://localhost:3000", ViewerId::stub()).timeout,
            Duration::from_secs(30)
        );
    }
}
