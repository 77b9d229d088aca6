//! Storefront configuration
//!
//! Settings come from command line flags, falling back to environment variables and a
//! `.env` file.

use std::path::PathBuf;

use clap::Args;
use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The currency code is not a known ISO 4217 code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The tax rate is negative.
    #[error("Tax rate must not be negative: {0}")]
    NegativeTaxRate(Decimal),
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STOREFRONT_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "STOREFRONT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Storefront settings.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Directory holding the persisted cart, theme and session
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = "./.storefront", global = true)]
    pub data_dir: PathBuf,

    /// Product catalog fixture
    #[arg(
        long,
        env = "STOREFRONT_CATALOG",
        default_value = "./fixtures/products.yml",
        global = true
    )]
    pub catalog: PathBuf,

    /// ISO 4217 currency code prices are quoted in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "TZS", global = true)]
    pub currency: String,

    /// Tax rate as a fraction, e.g. 0.10 for 10%
    #[arg(long, env = "STOREFRONT_TAX_RATE", default_value = "0.10", global = true)]
    pub tax_rate: Decimal,

    /// Use dark mode when no theme has been saved yet
    #[arg(long, env = "STOREFRONT_SYSTEM_DARK", global = true)]
    pub system_dark: bool,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for an unrecognised code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        resolve_currency(&self.currency)
    }

    /// Resolve the configured tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NegativeTaxRate`] if the rate is below zero.
    pub fn tax_rate(&self) -> Result<Percentage, ConfigError> {
        if self.tax_rate.is_sign_negative() && !self.tax_rate.is_zero() {
            return Err(ConfigError::NegativeTaxRate(self.tax_rate));
        }

        Ok(Percentage::from(self.tax_rate))
    }
}

/// Look up an ISO 4217 currency by code, ignoring case.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for an unrecognised code.
pub fn resolve_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    let code = code.trim().to_uppercase();

    iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: StorefrontConfig,
    }

    #[test]
    fn defaults_resolve() -> TestResult {
        let cli = TestCli::try_parse_from(["storefront"])?;

        assert_eq!(cli.config.currency()?, iso::TZS);
        assert_eq!(cli.config.logging.log_format, LogFormat::Compact);
        assert!(!cli.config.system_dark);

        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let cli = TestCli::try_parse_from([
            "storefront",
            "--currency",
            "usd",
            "--tax-rate",
            "0.18",
            "--log-format",
            "json",
            "--data-dir",
            "/tmp/shop",
        ])?;

        assert_eq!(cli.config.currency()?, iso::USD);
        assert_eq!(cli.config.tax_rate, Decimal::new(18, 2));
        assert_eq!(cli.config.logging.log_format, LogFormat::Json);
        assert_eq!(cli.config.data_dir, PathBuf::from("/tmp/shop"));

        Ok(())
    }

    #[test]
    fn unknown_currency_errors() {
        assert!(matches!(
            resolve_currency("XYZ1"),
            Err(ConfigError::UnknownCurrency(code)) if code == "XYZ1"
        ));
    }

    #[test]
    fn negative_tax_rate_errors() -> TestResult {
        let cli = TestCli::try_parse_from(["storefront", "--tax-rate=-0.1"])?;

        assert!(matches!(
            cli.config.tax_rate(),
            Err(ConfigError::NegativeTaxRate(_))
        ));

        Ok(())
    }
}
