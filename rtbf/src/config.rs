use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::lifecycle::LifecyclePolicy;
use crate::error::ConfigError;

const DEFAULT_USER_AGENT: &str = "comment_manager by u/user";
const DEFAULT_REPLACEMENT_TEXT: &str = "[Comment deleted by user]";
const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LLM_PROMPT: &str = "Rewrite this comment in a more friendly tone: {comment}";
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Upper bound on comments scanned per cycle
pub const MAX_COMMENT_LIMIT: u32 = 1000;

/// Sleep after an unexpected cycle failure
pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// How replacement text is produced when a comment is obfuscated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Fixed replacement text
    Static,
    /// Random emoji from a built-in set
    RandomToken,
    /// Text generated by an external LLM, falling back to a random emoji
    ExternalRewrite,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Static => write!(f, "update"),
            StrategyKind::RandomToken => write!(f, "emoji"),
            StrategyKind::ExternalRewrite => write!(f, "llm"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "update" | "static" => Ok(StrategyKind::Static),
            "emoji" | "random" => Ok(StrategyKind::RandomToken),
            "llm" => Ok(StrategyKind::ExternalRewrite),
            _ => Err("must be 'update', 'emoji', or 'llm'".to_string()),
        }
    }
}

/// Reddit script-app credentials
#[derive(Clone)]
pub struct RedditCredentials {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Settings for the replacement text produced on obfuscation
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub replacement_text: String,
    pub watermark: String,
    pub append_watermark: bool,
}

/// External rewrite service settings
#[derive(Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    /// Prompt with a `{comment}` placeholder
    pub prompt_template: String,
    /// Optional; local services such as Ollama need none
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("prompt_template", &self.prompt_template)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Poll loop and queue pacing
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub poll_interval: Duration,
    pub scan_limit: u32,
    /// Pause between consecutive mutations
    pub mutation_delay: Duration,
    /// Pause after an unexpected cycle failure
    pub retry_delay: Duration,
}

/// Process-wide configuration, built once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub reddit: RedditCredentials,
    pub policy: LifecyclePolicy,
    pub strategy: StrategyConfig,
    pub llm: LlmConfig,
    pub schedule: ScheduleConfig,
    expire_minutes: u32,
    delete_minutes: u32,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = [
            "REDDIT_USERNAME",
            "REDDIT_PASSWORD",
            "REDDIT_CLIENT_ID",
            "REDDIT_CLIENT_SECRET",
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .copied()
            .filter(|key| lookup(*key).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let reddit = RedditCredentials {
            username: get("REDDIT_USERNAME", ""),
            password: get("REDDIT_PASSWORD", ""),
            client_id: get("REDDIT_CLIENT_ID", ""),
            client_secret: get("REDDIT_CLIENT_SECRET", ""),
            user_agent: get("REDDIT_USER_AGENT", DEFAULT_USER_AGENT),
        };

        let expire_minutes = parse_number(&lookup, "EXPIRE_MINUTES", 120)?;
        let delete_minutes = parse_number(&lookup, "DELETE_MINUTES", 1440)?;

        let raw_strategy = get("STRATEGY", "update");
        let kind = raw_strategy
            .parse::<StrategyKind>()
            .map_err(|reason| ConfigError::Invalid {
                key: "STRATEGY",
                value: raw_strategy.clone(),
                reason,
            })?;

        let watermark = get("WATERMARK", "#rtbf");
        if watermark.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "WATERMARK",
                value: watermark,
                reason: "must not be empty".to_string(),
            });
        }

        let append_watermark = get("APPEND_WATERMARK", "true").eq_ignore_ascii_case("true");

        let scan_limit = parse_number(&lookup, "COMMENT_LIMIT", 100)?;
        if scan_limit == 0 || scan_limit > MAX_COMMENT_LIMIT {
            return Err(ConfigError::Invalid {
                key: "COMMENT_LIMIT",
                value: scan_limit.to_string(),
                reason: format!("must be between 1 and {}", MAX_COMMENT_LIMIT),
            });
        }

        let check_interval_minutes = parse_number(&lookup, "CHECK_INTERVAL_MINUTES", 30)?;
        if check_interval_minutes == 0 {
            return Err(ConfigError::Invalid {
                key: "CHECK_INTERVAL_MINUTES",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let mutation_delay_seconds = parse_number(&lookup, "MUTATION_DELAY_SECONDS", 1)?;
        let llm_timeout_seconds = parse_number(&lookup, "LLM_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            reddit,
            policy: LifecyclePolicy {
                obfuscate_after: chrono::Duration::minutes(i64::from(expire_minutes)),
                delete_after: chrono::Duration::minutes(i64::from(delete_minutes)),
                watermark: watermark.clone(),
                ignore_flag: get("FLAG_IGNORE", "/fn"),
            },
            strategy: StrategyConfig {
                kind,
                replacement_text: get("REPLACEMENT_TEXT", DEFAULT_REPLACEMENT_TEXT),
                watermark,
                append_watermark,
            },
            llm: LlmConfig {
                api_url: get("LLM_API_URL", DEFAULT_LLM_API_URL),
                model: get("LLM_MODEL", DEFAULT_LLM_MODEL),
                prompt_template: get("LLM_PROMPT", DEFAULT_LLM_PROMPT),
                api_key: lookup("LLM_API_KEY").filter(|key| !key.is_empty()),
                timeout: Duration::from_secs(u64::from(llm_timeout_seconds)),
            },
            schedule: ScheduleConfig {
                poll_interval: Duration::from_secs(u64::from(check_interval_minutes) * 60),
                scan_limit,
                mutation_delay: Duration::from_secs(u64::from(mutation_delay_seconds)),
                retry_delay: RETRY_DELAY,
            },
            expire_minutes,
            delete_minutes,
        })
    }

    /// Deletion configured to happen before obfuscation
    pub fn thresholds_inverted(&self) -> bool {
        self.delete_minutes < self.expire_minutes
    }

    /// Log the effective configuration without secrets
    pub fn log_summary(&self) {
        tracing::info!(
            expire_minutes = self.expire_minutes,
            delete_minutes = self.delete_minutes,
            strategy = %self.strategy.kind,
            check_interval_minutes = self.schedule.poll_interval.as_secs() / 60,
            watermark = %self.policy.watermark,
            flag_ignore = %self.policy.ignore_flag,
            append_watermark = self.strategy.append_watermark,
            comment_limit = self.schedule.scan_limit,
            "Configuration loaded"
        );

        if self.strategy.kind == StrategyKind::ExternalRewrite {
            let api_key_status = if self.llm.api_key.is_some() {
                "configured"
            } else {
                "not set (unauthenticated)"
            };
            let prompt_preview: String = self.llm.prompt_template.chars().take(50).collect();
            let ellipsis = if self.llm.prompt_template.chars().count() > 50 {
                "..."
            } else {
                ""
            };
            tracing::info!(
                model = %self.llm.model,
                api_url = %self.llm.api_url,
                api_key = api_key_status,
                "LLM prompt: {}{}",
                prompt_preview,
                ellipsis
            );
        }

        if self.thresholds_inverted() {
            tracing::warn!(
                "DELETE_MINUTES ({}) is shorter than EXPIRE_MINUTES ({}); comments will be \
                 obfuscated and then deleted on the following cycle",
                self.delete_minutes,
                self.expire_minutes
            );
        }
    }
}

/// Tracing filter directive from `LOG_LEVEL` (Python-style level names accepted)
pub fn log_filter_from_env() -> String {
    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    format!("info,rtbf={}", tracing_level(&level))
}

fn tracing_level(level: &str) -> &'static str {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARN" | "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

fn parse_number<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a non-negative integer".to_string(),
        }),
    }
}
