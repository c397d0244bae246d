//! Strategy Service
//!
//! Produces the replacement text written over a comment when it is
//! obfuscated. The strategy is selected once at startup; the external rewrite
//! strategy never fails outward and falls back to a random token instead.

use std::sync::Arc;

use rand::Rng;

use crate::config::{LlmConfig, StrategyConfig, StrategyKind};
use crate::domain::ports::TextRewriter;

/// Built-in replacement tokens for the random strategy
pub const REPLACEMENT_TOKENS: [&str; 30] = [
    "😀", "😂", "😊", "😍", "🤔", "😎", "😢", "😡", "🙄", "😴", "👍", "👎", "👌", "✌️", "🤷",
    "🔥", "💯", "❤️", "🎉", "🤝", "🌟", "⚡", "💡", "🎯", "🚀", "💪", "🎈", "🎁", "☕", "🍕",
];

/// Placeholder substituted with the original comment body in LLM prompts
pub const PROMPT_PLACEHOLDER: &str = "{comment}";

/// Pick a replacement token uniformly at random
pub fn random_token() -> &'static str {
    let index = rand::thread_rng().gen_range(0..REPLACEMENT_TOKENS.len());
    REPLACEMENT_TOKENS[index]
}

/// Append the watermark as Reddit superscript: `text ^(watermark)`
pub fn with_watermark(text: &str, watermark: &str) -> String {
    format!("{} ^({})", text, watermark)
}

/// Render an LLM prompt for a comment body
pub fn render_prompt(template: &str, body: &str) -> String {
    template.replace(PROMPT_PLACEHOLDER, body)
}

/// The active replacement strategy
pub enum ReplacementStrategy<R: TextRewriter> {
    Static {
        text: String,
    },
    RandomToken,
    ExternalRewrite {
        rewriter: Arc<R>,
        prompt_template: String,
    },
}

/// Service resolving replacement text for obfuscated comments
pub struct StrategyService<R: TextRewriter> {
    strategy: ReplacementStrategy<R>,
    /// Appended to every replacement when set
    watermark: Option<String>,
}

impl<R: TextRewriter> StrategyService<R> {
    pub fn new(strategy: ReplacementStrategy<R>, watermark: Option<String>) -> Self {
        Self {
            strategy,
            watermark,
        }
    }

    /// Build from configuration. `rewriter` is only used by the LLM strategy;
    /// without one that strategy degrades to random tokens.
    pub fn from_config(config: &StrategyConfig, llm: &LlmConfig, rewriter: Option<Arc<R>>) -> Self {
        let strategy = match (config.kind, rewriter) {
            (StrategyKind::Static, _) => ReplacementStrategy::Static {
                text: config.replacement_text.clone(),
            },
            (StrategyKind::RandomToken, _) => ReplacementStrategy::RandomToken,
            (StrategyKind::ExternalRewrite, Some(rewriter)) => ReplacementStrategy::ExternalRewrite {
                rewriter,
                prompt_template: llm.prompt_template.clone(),
            },
            (StrategyKind::ExternalRewrite, None) => {
                tracing::warn!("No rewrite service available, using random tokens instead");
                ReplacementStrategy::RandomToken
            }
        };

        let watermark = config
            .append_watermark
            .then(|| config.watermark.clone());

        Self::new(strategy, watermark)
    }

    /// Resolve the text that replaces `original_body`
    pub async fn resolve_replacement(&self, original_body: &str) -> String {
        let text = match &self.strategy {
            ReplacementStrategy::Static { text } => text.clone(),
            ReplacementStrategy::RandomToken => random_token().to_string(),
            ReplacementStrategy::ExternalRewrite {
                rewriter,
                prompt_template,
            } => Self::rewrite(rewriter.as_ref(), prompt_template, original_body).await,
        };

        match &self.watermark {
            Some(watermark) => with_watermark(&text, watermark),
            None => text,
        }
    }

    async fn rewrite(rewriter: &R, prompt_template: &str, original_body: &str) -> String {
        let prompt = render_prompt(prompt_template, original_body);

        match rewriter.generate(&prompt).await {
            Ok(generated) => {
                let generated = generated.trim();
                if generated.is_empty() {
                    tracing::error!("LLM API returned an empty completion, falling back to emoji");
                    return random_token().to_string();
                }
                let preview: String = generated.chars().take(100).collect();
                tracing::debug!("LLM generated replacement: {}...", preview);
                generated.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "LLM API call failed, falling back to emoji");
                random_token().to_string()
            }
        }
    }
}
