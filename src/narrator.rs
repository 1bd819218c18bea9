use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{CoachError, CoachResult};
use crate::hand::{PositionContext, Street};
use crate::range::RangeStats;
use crate::spr::SprSnapshot;
use crate::strategy::{parse_llm_tree, strip_code_fences, StrategyTree};
use crate::texture::{BoardTexture, TextureNarrative};

const DEFAULT_TIMEOUT_SECS: u64 = 12;
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Context handed to the texture narration call.
#[derive(Debug, Clone, Serialize)]
pub struct TextureRequest {
    pub board: Vec<String>,
    pub texture: Option<BoardTexture>,
}

/// Everything Tiers 1-3 produced, serialized as context for the strategy
/// call.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRequest {
    pub position: PositionContext,
    pub hero_hand: Vec<String>,
    pub board: Vec<String>,
    pub narrative: TextureNarrative,
    pub hero_stats: BTreeMap<Street, RangeStats>,
    pub villain_stats: BTreeMap<Street, RangeStats>,
    pub sprs: Vec<SprSnapshot>,
    pub hero_equity: f64,
}

/// Port for the two externally-delegated narrative stages. The pipeline
/// only ever talks to this trait, so tests swap in [`StaticNarrator`].
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn board_texture(&self, request: &TextureRequest) -> CoachResult<TextureNarrative>;
    async fn strategy(&self, request: &StrategyRequest) -> CoachResult<StrategyTree>;
}

#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl NarratorConfig {
    /// Reads `COACH_LLM_URL`, `COACH_LLM_KEY` and optionally
    /// `COACH_LLM_MODEL`. Returns None when no endpoint is configured, in
    /// which case the pipeline runs on local fallbacks only.
    pub fn from_env() -> Option<NarratorConfig> {
        let base_url = std::env::var("COACH_LLM_URL").ok()?;
        let api_key = std::env::var("COACH_LLM_KEY").ok()?;
        let model =
            std::env::var("COACH_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(NarratorConfig {
            base_url,
            api_key,
            model,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// OpenAI-style chat-completions client for both narrative stages.
pub struct HttpNarrator {
    client: reqwest::Client,
    config: NarratorConfig,
}

impl HttpNarrator {
    pub fn new(config: NarratorConfig) -> CoachResult<HttpNarrator> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoachError::ExternalService(e.to_string()))?;
        Ok(HttpNarrator { client, config })
    }

    async fn complete(&self, system: &str, user: String) -> CoachResult<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.2,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::ExternalService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CoachError::ExternalService(format!(
                "narrative service returned {}",
                response.status()
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| CoachError::ExternalService(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                CoachError::ExternalService("narrative service returned no choices".to_string())
            })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

const TEXTURE_SYSTEM: &str = "You are a poker board-texture analyst. Given a community board, \
reply with JSON only: {\"street_tags\": {\"flop\": \"...\", ...}, \"paired\": bool, \
\"flush_possible\": bool, \"straight_possible\": bool, \"summary\": \"...\"} where each tag is a \
short texture description (e.g. \"wet, two-tone, connected\").";

const STRATEGY_SYSTEM: &str = "You are a heads-up no-limit hold'em GTO coach. Given the hand \
context, reply with JSON only, keyed by street (preflop/flop/turn/river), each street keyed by \
branch (initial/vs_check/vs_bet/vs_raise), each node of the form {\"primary\": {\"action\": \
\"bet\", \"frequency\": 0.7, \"sizing\": \"66% pot\"}, \"alternative\": {\"action\": \"check\", \
\"frequency\": 0.3}}. Frequencies are in [0, 1].";

#[async_trait]
impl Narrator for HttpNarrator {
    async fn board_texture(&self, request: &TextureRequest) -> CoachResult<TextureNarrative> {
        let user = serde_json::to_string(request)?;
        let content = self.complete(TEXTURE_SYSTEM, user).await?;
        let narrative: TextureNarrative = serde_json::from_str(strip_code_fences(&content))
            .map_err(|e| {
                CoachError::ExternalService(format!("unparsable texture response: {e}"))
            })?;
        Ok(narrative)
    }

    async fn strategy(&self, request: &StrategyRequest) -> CoachResult<StrategyTree> {
        let user = serde_json::to_string(request)?;
        let content = self.complete(STRATEGY_SYSTEM, user).await?;
        parse_llm_tree(&content)
    }
}

/// Deterministic narrator for tests and offline runs. Responses are fixed
/// at construction; `failing()` simulates an unavailable service.
#[derive(Default)]
pub struct StaticNarrator {
    pub texture: Option<TextureNarrative>,
    pub tree: Option<StrategyTree>,
}

impl StaticNarrator {
    pub fn new(texture: TextureNarrative, tree: StrategyTree) -> StaticNarrator {
        StaticNarrator {
            texture: Some(texture),
            tree: Some(tree),
        }
    }

    pub fn failing() -> StaticNarrator {
        StaticNarrator::default()
    }
}

#[async_trait]
impl Narrator for StaticNarrator {
    async fn board_texture(&self, _request: &TextureRequest) -> CoachResult<TextureNarrative> {
        self.texture.clone().ok_or_else(|| {
            CoachError::ExternalService("texture narrator unavailable".to_string())
        })
    }

    async fn strategy(&self, _request: &StrategyRequest) -> CoachResult<StrategyTree> {
        self.tree.clone().ok_or_else(|| {
            CoachError::ExternalService("strategy narrator unavailable".to_string())
        })
    }
}

/// Applies the bounded timeout and converts any failure into the supplied
/// fallback, reporting whether the fallback fired.
pub async fn with_fallback<T, F>(
    stage: &str,
    timeout: Duration,
    call: F,
    fallback: impl FnOnce() -> T,
) -> (T, bool)
where
    F: std::future::Future<Output = CoachResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => (value, false),
        Ok(Err(err)) => {
            log::warn!("{stage} narrative failed, using local fallback: {err}");
            (fallback(), true)
        }
        Err(_) => {
            log::warn!("{stage} narrative timed out after {timeout:?}, using local fallback");
            (fallback(), true)
        }
    }
}
