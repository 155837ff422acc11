use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_KAKAO_API_BASE: &str = "https://kapi.kakao.com";
pub const DEFAULT_KAKAO_LINK_URL: &str = "https://example.com/question-status";
pub const DEFAULT_CLAUDE_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct KakaoConfig {
    pub access_token: String,
    pub api_base: String,
    pub link_url: String,
    pub question_button_title: String,
    pub reservation_button_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceProvider {
    Claude,
    Gemini,
}

impl FromStr for InferenceProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(InferenceProvider::Claude),
            "gemini" | "google" => Ok(InferenceProvider::Gemini),
            _ => Err(ConfigError::Invalid {
                name: "LLM_PROVIDER",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub provider: InferenceProvider,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_base: String,
}

impl InferenceConfig {
    /// Claude defaults: claude-3-haiku, 1000 tokens, temperature 0.7
    pub fn claude(api_key: impl Into<String>) -> Self {
        Self {
            provider: InferenceProvider::Claude,
            api_key: api_key.into(),
            model: DEFAULT_CLAUDE_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            api_base: DEFAULT_CLAUDE_API_BASE.to_string(),
        }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: InferenceProvider::Gemini,
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub is_production: bool,
}

/// Complete service configuration.
///
/// A channel or inference provider whose credentials are absent is left as
/// `None`; the service runs with whatever is configured.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telegram: Option<TelegramConfig>,
    pub kakao: Option<KakaoConfig>,
    pub inference: Option<InferenceConfig>,
    pub materials_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment and an optional `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => parse_value("BIND_ADDR", &value)?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(value) => match parse_value("REQUEST_TIMEOUT_SECS", &value)? {
                // A zero timeout would fail every request
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => Duration::from_secs(30),
        };

        let is_production = get("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_base: get("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::Missing("TELEGRAM_CHAT_ID")),
            (None, Some(_)) => return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN")),
            (None, None) => None,
        };

        let kakao = get("KAKAO_TOKEN").map(|access_token| KakaoConfig {
            access_token,
            api_base: get("KAKAO_API_BASE").unwrap_or_else(|| DEFAULT_KAKAO_API_BASE.to_string()),
            link_url: get("KAKAO_LINK_URL").unwrap_or_else(|| DEFAULT_KAKAO_LINK_URL.to_string()),
            question_button_title: get("KAKAO_QUESTION_BUTTON_TITLE")
                .unwrap_or_else(|| "Check answer".to_string()),
            reservation_button_title: get("KAKAO_RESERVATION_BUTTON_TITLE")
                .unwrap_or_else(|| "View booking".to_string()),
        });

        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => InferenceProvider::Claude,
        };

        let api_key = match provider {
            InferenceProvider::Claude => get("ANTHROPIC_API_KEY"),
            InferenceProvider::Gemini => get("GEMINI_API_KEY"),
        };

        let inference = match api_key {
            Some(api_key) => {
                let mut config = match provider {
                    InferenceProvider::Claude => InferenceConfig::claude(api_key),
                    InferenceProvider::Gemini => InferenceConfig::gemini(api_key),
                };
                if let Some(model) = get("LLM_MODEL") {
                    config.model = model;
                }
                if let Some(value) = get("LLM_MAX_TOKENS") {
                    config.max_tokens = parse_value("LLM_MAX_TOKENS", &value)?;
                }
                if let Some(value) = get("LLM_TEMPERATURE") {
                    config.temperature = parse_value("LLM_TEMPERATURE", &value)?;
                }
                if let Some(api_base) = get("LLM_API_BASE") {
                    config.api_base = api_base;
                }
                Some(config)
            }
            None => None,
        };

        let materials_dir = get("COURSE_MATERIALS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            server: ServerConfig {
                bind_addr,
                request_timeout,
                is_production,
            },
            telegram,
            kakao,
            inference,
            materials_dir,
        })
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
