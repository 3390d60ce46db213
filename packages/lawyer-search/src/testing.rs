//! Testing utilities including mock implementations.
//!
//! These let applications and tests exercise the pipeline without network
//! or model calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::ProfileFetcher;
use crate::judge::ChatModel;

/// A mock chat model.
///
/// Replies are chosen by the first registered needle found in the user
/// prompt, falling back to the default reply.
pub struct MockChatModel {
    default_reply: Result<String, String>,

    /// (needle, reply) pairs, checked in registration order
    rules: Vec<(String, Result<String, String>)>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockChatCall>>>,
}

/// Record of a call made to the mock model.
#[derive(Debug, Clone)]
pub struct MockChatCall {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl MockChatModel {
    /// Mock that answers every prompt with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            default_reply: Ok(reply.into()),
            rules: Vec::new(),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_reply: Err(message.into()),
            ..Self::new("")
        }
    }

    /// Reply with `reply` when the user prompt contains `needle`.
    pub fn with_response_for(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(reply.into())));
        self
    }

    /// Fail with `message` when the user prompt contains `needle`.
    pub fn with_failure_for(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Err(message.into())));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockChatCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        self.calls.write().unwrap().push(MockChatCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| user_prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default_reply);

        reply.clone().map_err(|message| anyhow::anyhow!(message))
    }
}

/// Canned result for one URL.
#[derive(Debug, Clone)]
enum MockPage {
    Text(String),
    Blocked,
    Timeout,
}

/// A mock fetcher serving canned pages.
///
/// URLs without a registered page fail with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, MockPage>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` (already visible text) for `url`.
    pub fn with_text(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), MockPage::Text(text.into()));
        self
    }

    /// Report `url` as blocked.
    pub fn with_blocked(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), MockPage::Blocked);
        self
    }

    /// Fail `url` as if the request timed out.
    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), MockPage::Timeout);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl ProfileFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Option<String>> {
        self.requests.write().unwrap().push(url.to_string());

        match self.pages.get(url) {
            Some(MockPage::Text(text)) => Ok(Some(text.clone())),
            Some(MockPage::Blocked) => Ok(None),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
