use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

use crate::config::{env_or, ConfigError};
use crate::model::quote::DocumentKind;

/// Names used when spelling out an amount ("one dollar and five cents").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyWords {
    pub name: String,
    pub name_plural: String,
    pub subunit: String,
    pub subunit_plural: String,
}

impl Default for CurrencyWords {
    fn default() -> Self {
        CurrencyWords {
            name: "dollar".to_string(),
            name_plural: "dollars".to_string(),
            subunit: "cent".to_string(),
            subunit_plural: "cents".to_string(),
        }
    }
}

/// Settings for numbering, exports and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub quote_prefix: String,
    pub invoice_prefix: String,
    pub receipt_prefix: String,
    pub invoice_due_days: i64,
    pub currency: CurrencyWords,
    pub font_dir: String,
    pub font_name: String,
    pub low_stock_threshold: i64,
}

impl DocumentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading document configuration from environment variables");
        let defaults = DocumentConfig::default();
        let text = |key: &str, fallback: String| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        let config = DocumentConfig {
            quote_prefix: text("QUOTE_NUMBER_PREFIX", defaults.quote_prefix),
            invoice_prefix: text("INVOICE_NUMBER_PREFIX", defaults.invoice_prefix),
            receipt_prefix: text("RECEIPT_NUMBER_PREFIX", defaults.receipt_prefix),
            invoice_due_days: env_or("INVOICE_DUE_DAYS", defaults.invoice_due_days)?,
            currency: CurrencyWords {
                name: text("CURRENCY_NAME", defaults.currency.name),
                name_plural: text("CURRENCY_NAME_PLURAL", defaults.currency.name_plural),
                subunit: text("CURRENCY_SUBUNIT", defaults.currency.subunit),
                subunit_plural: text("CURRENCY_SUBUNIT_PLURAL", defaults.currency.subunit_plural),
            },
            font_dir: text("PDF_FONT_DIR", defaults.font_dir),
            font_name: text("PDF_FONT_NAME", defaults.font_name),
            low_stock_threshold: env_or("LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, prefix) in [
            ("QUOTE_NUMBER_PREFIX", &self.quote_prefix),
            ("INVOICE_NUMBER_PREFIX", &self.invoice_prefix),
            ("RECEIPT_NUMBER_PREFIX", &self.receipt_prefix),
        ] {
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be a non-empty alphanumeric prefix, got '{}'",
                    key, prefix
                )));
            }
        }
        if self.invoice_due_days < 0 {
            return Err(ConfigError::ValidationError("INVOICE_DUE_DAYS cannot be negative".to_string()));
        }
        Ok(())
    }

    pub fn prefix_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Quote => &self.quote_prefix,
            DocumentKind::Invoice => &self.invoice_prefix,
            DocumentKind::Receipt => &self.receipt_prefix,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            quote_prefix: "QT".to_string(),
            invoice_prefix: "INV".to_string(),
            receipt_prefix: "RC".to_string(),
            invoice_due_days: 30,
            currency: CurrencyWords::default(),
            font_dir: "./fonts".to_string(),
            font_name: "Roboto".to_string(),
            low_stock_threshold: 5,
        }
    }
}
