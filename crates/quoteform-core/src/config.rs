use crate::error::QuoteError;
use crate::parsing::context::ContextLimits;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How merged table rows are judged selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Requires a usable quantity plus a price, unit cost or inclusion keyword.
    #[default]
    Strict,
    /// Any non-blank, non-negative selection (or quantity) text selects the row.
    Lenient,
}

/// Tunables for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Items priced at or above this are main machines.
    pub price_threshold: Decimal,
    pub selection_policy: SelectionPolicy,
    /// Pages after the trigger page that contextual capture may run into.
    pub context_page_span: usize,
    /// Leading characters of another item's description used as a stop marker.
    pub stop_marker_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            price_threshold: Decimal::from(10_000),
            selection_policy: SelectionPolicy::Strict,
            context_page_span: 2,
            stop_marker_chars: 70,
        }
    }
}

impl ExtractionConfig {
    pub fn context_limits(&self) -> ContextLimits {
        ContextLimits {
            page_span: self.context_page_span,
            stop_marker_chars: self.stop_marker_chars,
        }
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<ExtractionConfig, QuoteError> {
    let content = std::fs::read_to_string(path).map_err(|e| QuoteError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ExtractionConfig =
        serde_json::from_str(&content).map_err(|e| QuoteError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<ExtractionConfig, QuoteError> {
    let config: ExtractionConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ExtractionConfig) -> Result<(), QuoteError> {
    if config.price_threshold.is_sign_negative() {
        return Err(QuoteError::ConfigInvalid(format!(
            "price_threshold must not be negative (got {})",
            config.price_threshold
        )));
    }

    if config.stop_marker_chars == 0 {
        return Err(QuoteError::ConfigInvalid(
            "stop_marker_chars must be greater than zero".into(),
        ));
    }

    Ok(())
}
