//! LLM pass/fail judgment of a profile against a criterion.
//!
//! The model is told to put its reasoning in `<thinking>` and its verdict
//! (`Pass` or `Fail`) in `<answer>`. These tags are a prompt convention only;
//! nothing on the model side enforces them, so the parser fails closed.

use async_trait::async_trait;
use llm_client::{ChatRequest, LlmClient, DEFAULT_MODEL};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{JudgeError, JudgeResult};
use crate::evaluator::Outcome;

pub const ANSWER_OPEN: &str = "<answer>";
pub const ANSWER_CLOSE: &str = "</answer>";
const THINKING_OPEN: &str = "<thinking>";
const THINKING_CLOSE: &str = "</thinking>";

/// Verdict literal that counts as a pass (compared case-insensitively).
const PASS: &str = "pass";

const SYSTEM_PROMPT: &str = r#"You are evaluating a lawyer whether they pass a given criterion.

Respond in the following format:
<thinking>...</thinking>, within which you include your detailed thought process.
<answer>...</answer>, within which you include your final answer. "Pass" or "Fail"."#;

/// Single-turn chat model used by the judge.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system + user message pair and return the raw reply text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;
}

/// [`ChatModel`] backed by an [`LlmClient`].
#[derive(Debug, Clone)]
pub struct LlmChatModel {
    client: LlmClient,
    model: String,
}

impl LlmChatModel {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ChatModel for LlmChatModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let request =
            ChatRequest::from_prompts(&self.model, Some(system_prompt), None, Some(user_prompt));

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(response.content)
    }
}

/// How to locate the verdict in a model reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// First `<answer>`, then the first `</answer>` after it.
    #[default]
    FirstOccurrence,

    /// Last complete `<answer>` block outside any `<thinking>` block.
    ///
    /// Survives replies whose reasoning quotes the answer tags or that revise
    /// an earlier answer.
    LastBlock,
}

/// Asks a chat model whether a profile meets a criterion.
#[derive(Clone)]
pub struct Judge {
    model: Arc<dyn ChatModel>,
    parse_mode: ParseMode,
}

impl Judge {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            parse_mode: ParseMode::default(),
        }
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    /// Judge a profile. Never errors: model failures and malformed replies
    /// are logged and reported as [`Outcome::Failed`].
    pub async fn judge(&self, profile_text: &str, criterion: &str) -> Outcome {
        match self.verdict(profile_text, criterion).await {
            Ok(true) => Outcome::Matched,
            Ok(false) => Outcome::NotMatched,
            Err(e) => {
                warn!(error = %e, "Judgment failed, treating as no match");
                Outcome::Failed(e.to_string())
            }
        }
    }

    /// Ask the model and parse its verdict.
    pub async fn verdict(&self, profile_text: &str, criterion: &str) -> JudgeResult<bool> {
        let user_prompt = user_prompt(criterion, profile_text);
        let response = self
            .model
            .complete(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|e| JudgeError::Model(format!("{:#}", e)))?;

        debug!(response_len = response.len(), "Judge response received");
        parse_verdict(&response, self.parse_mode)
    }
}

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

pub fn user_prompt(criterion: &str, profile_text: &str) -> String {
    format!(
        "Here is the query: {}\nHere is the lawyer's profile: {}",
        criterion, profile_text
    )
}

/// Extract the verdict from a model reply.
///
/// `Ok(true)` only when the answer span, trimmed, equals `pass` ignoring
/// case. A reply without a complete answer block is an error.
pub fn parse_verdict(response: &str, mode: ParseMode) -> JudgeResult<bool> {
    let answer = match mode {
        ParseMode::FirstOccurrence => first_answer(response),
        ParseMode::LastBlock => last_answer(&strip_thinking(response)).map(str::to_string),
    };

    answer
        .map(|a| a.trim().eq_ignore_ascii_case(PASS))
        .ok_or_else(|| JudgeError::MalformedResponse {
            excerpt: excerpt(response),
        })
}

fn first_answer(response: &str) -> Option<String> {
    let start = response.find(ANSWER_OPEN)? + ANSWER_OPEN.len();
    let len = response[start..].find(ANSWER_CLOSE)?;
    Some(response[start..start + len].to_string())
}

fn last_answer(response: &str) -> Option<&str> {
    let mut search_end = response.len();
    // Walk answer openings from the back until one has a closing tag.
    while let Some(open) = response[..search_end].rfind(ANSWER_OPEN) {
        let start = open + ANSWER_OPEN.len();
        if let Some(len) = response[start..].find(ANSWER_CLOSE) {
            return Some(&response[start..start + len]);
        }
        search_end = open;
    }
    None
}

/// Remove `<thinking>...</thinking>` spans. An unclosed thinking block runs
/// to the end of the reply.
fn strip_thinking(response: &str) -> String {
    let mut out = String::with_capacity(response.len());
    let mut rest = response;
    while let Some(open) = rest.find(THINKING_OPEN) {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + THINKING_OPEN.len()..];
        match after_open.find(THINKING_CLOSE) {
            Some(close) => rest = &after_open[close + THINKING_CLOSE.len()..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn excerpt(response: &str) -> String {
    const MAX_CHARS: usize = 120;
    let mut excerpt: String = response.chars().take(MAX_CHARS).collect();
    if response.chars().count() > MAX_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}
