use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.mercari.jp";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Process-wide settings, read once at startup and then passed around by value.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Weights of the shallow score. Each signal is multiplied by its weight and summed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub relevance: f64,
    pub seller_rating: f64,
    pub price: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            relevance: 4.0,
            seller_rating: 1.2,
            price: 1.3,
        }
    }
}

/// Tunables of the recommendation pipeline. Scoring is a pure function of a
/// listing, the relevance tokens and this value.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Raw listings kept per search candidate.
    pub max_shallow: usize,
    /// Shallow survivors handed to the enricher.
    pub max_candidates: usize,
    /// Length cap of the final shortlist.
    pub max_return: usize,
    pub min_seller_rating: f64,
    /// Rating assumed for listings whose seller rating is unknown.
    pub neutral_seller_rating: f64,
    /// Budget used when no candidate carries a max price.
    pub default_max_budget: Option<u64>,
    pub high_budget_threshold: u64,
    pub reasonable_price_floor: u64,
    pub reasonable_price_fraction: f64,
    pub target_price_fraction: f64,
    /// Width of the price falloff, as a multiple of the target price.
    pub price_decay: f64,
    pub shipping_bonus: f64,
    pub weights: ScoreWeights,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            max_shallow: 120,
            max_candidates: 60,
            max_return: 10,
            min_seller_rating: 0.0,
            neutral_seller_rating: 0.0,
            default_max_budget: None,
            high_budget_threshold: 10_000,
            reasonable_price_floor: 500,
            reasonable_price_fraction: 0.25,
            target_price_fraction: 0.7,
            price_decay: 1.0,
            shipping_bonus: 0.5,
            weights: ScoreWeights::default(),
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shallow == 0 {
            return Err(ConfigError::Validation(
                "max_shallow must be greater than zero".to_string(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::Validation(
                "max_candidates must be greater than zero".to_string(),
            ));
        }
        if self.max_return == 0 {
            return Err(ConfigError::Validation(
                "max_return must be greater than zero".to_string(),
            ));
        }
        if !(self.target_price_fraction > 0.0 && self.target_price_fraction <= 1.0) {
            return Err(ConfigError::Validation(
                "target_price_fraction must be in (0, 1]".to_string(),
            ));
        }
        if !(self.price_decay.is_finite() && self.price_decay > 0.0) {
            return Err(ConfigError::Validation(
                "price_decay must be a positive number".to_string(),
            ));
        }
        let non_negative = [
            ("shipping_bonus", self.shipping_bonus),
            ("min_seller_rating", self.min_seller_rating),
            ("neutral_seller_rating", self.neutral_seller_rating),
            ("reasonable_price_fraction", self.reasonable_price_fraction),
            ("weights.relevance", self.weights.relevance),
            ("weights.seller_rating", self.weights.seller_rating),
            ("weights.price", self.weights.price),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a finite number, zero or greater"
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Reads the `BAZAAR_*` environment (and `.env`, if present).
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok(); // Load .env file if present

        let defaults = RecommenderConfig::default();
        let recommender = RecommenderConfig {
            max_shallow: parse_env("BAZAAR_MAX_SHALLOW", defaults.max_shallow)?,
            max_candidates: parse_env("BAZAAR_MAX_CANDIDATES", defaults.max_candidates)?,
            max_return: parse_env("BAZAAR_MAX_RETURN", defaults.max_return)?,
            min_seller_rating: parse_env("BAZAAR_MIN_SELLER_RATING", defaults.min_seller_rating)?,
            default_max_budget: parse_optional_env("BAZAAR_DEFAULT_MAX_BUDGET")?,
            high_budget_threshold: parse_env(
                "BAZAAR_HIGH_BUDGET_THRESHOLD",
                defaults.high_budget_threshold,
            )?,
            reasonable_price_floor: parse_env(
                "BAZAAR_REASONABLE_PRICE_FLOOR",
                defaults.reasonable_price_floor,
            )?,
            shipping_bonus: parse_env("BAZAAR_SHIPPING_BONUS", defaults.shipping_bonus)?,
            target_price_fraction: parse_env(
                "BAZAAR_TARGET_PRICE_FRACTION",
                defaults.target_price_fraction,
            )?,
            ..defaults
        };
        recommender.validate()?;

        Ok(Config {
            provider: ProviderConfig {
                base_url: get_env_or_default("BAZAAR_PROVIDER_URL", DEFAULT_PROVIDER_URL),
                timeout: Duration::from_secs(parse_env("BAZAAR_PROVIDER_TIMEOUT_SECS", 10)?),
            },
            server: ServerConfig {
                bind: get_env_or_default("BAZAAR_BIND", DEFAULT_BIND),
            },
            recommender,
        })
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    Ok(parse_optional_env(key)?.unwrap_or(default))
}

fn parse_optional_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Parse {
                    key: key.to_string(),
                    value,
                })
        }
        _ => Ok(None),
    }
}
