//! Runtime configuration (sales_report.toml + SALES_REPORT_* env overrides).

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};
use crate::model::report_file_name;
use crate::render::DEFAULT_CURRENCY_SYMBOL;
use crate::schedule::DailySchedule;

pub const DEFAULT_CONFIG_FILE: &str = "sales_report.toml";
pub const ENV_PREFIX: &str = "SALES_REPORT_";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465; // implicit TLS
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for the report pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the synthetic data file is written and read back from.
    #[serde(default = "default_data_path", deserialize_with = "text")]
    pub data_path: PathBuf,
    /// Directory receiving `daily_report_<date>.pdf` files.
    #[serde(default = "default_output_dir", deserialize_with = "text")]
    pub output_dir: PathBuf,
    /// Address that receives the report.
    #[serde(default, deserialize_with = "text")]
    pub recipient: String,
    /// Local wall-clock time of the daily run, `HH:MM`.
    #[serde(default = "default_schedule_time", deserialize_with = "text")]
    pub schedule_time: String,
    #[serde(default = "default_currency_symbol", deserialize_with = "text")]
    pub currency_symbol: String,
    #[serde(default = "default_subject", deserialize_with = "text")]
    pub subject: String,
    #[serde(default = "default_body", deserialize_with = "text")]
    pub body: String,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            output_dir: default_output_dir(),
            recipient: String::new(),
            schedule_time: default_schedule_time(),
            currency_symbol: default_currency_symbol(),
            subject: default_subject(),
            body: default_body(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// Mail relay settings. The password is never printed by `Debug`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host", deserialize_with = "text")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "text")]
    pub username: String,
    #[serde(default, deserialize_with = "text")]
    pub password: String,
    /// `From` address; the username is used when unset.
    #[serde(default, deserialize_with = "optional_text")]
    pub sender: Option<String>,
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            sender: None,
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ReportConfig {
    /// Loads defaults, then the TOML file (if present), then `SALES_REPORT_*`
    /// variables. Nested keys use `__`, e.g. `SALES_REPORT_SMTP__PASSWORD`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config: ReportConfig = Figment::from(Serialized::defaults(ReportConfig::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| ReportError::Config(err.to_string()))?;
        config.apply_text_env();
        Ok(config)
    }

    /// Figment reads `SALES_REPORT_SMTP__PASSWORD=007` as the number 7, so
    /// text settings are taken from the raw variable instead.
    fn apply_text_env(&mut self) {
        let raw = |key: &str| {
            std::env::var(format!("{ENV_PREFIX}{key}"))
                .ok()
                .filter(|value| !value.is_empty())
        };

        for (key, slot) in [
            ("RECIPIENT", &mut self.recipient),
            ("SCHEDULE_TIME", &mut self.schedule_time),
            ("CURRENCY_SYMBOL", &mut self.currency_symbol),
            ("SUBJECT", &mut self.subject),
            ("BODY", &mut self.body),
            ("SMTP__HOST", &mut self.smtp.host),
            ("SMTP__USERNAME", &mut self.smtp.username),
            ("SMTP__PASSWORD", &mut self.smtp.password),
        ] {
            if let Some(value) = raw(key) {
                *slot = value;
            }
        }
        if let Some(value) = raw("SMTP__SENDER") {
            self.smtp.sender = Some(value);
        }
        if let Some(value) = raw("DATA_PATH") {
            self.data_path = value.into();
        }
        if let Some(value) = raw("OUTPUT_DIR") {
            self.output_dir = value.into();
        }
    }

    /// Parsed daily trigger time.
    pub fn schedule(&self) -> Result<DailySchedule> {
        DailySchedule::parse(&self.schedule_time)
    }

    /// Path of the report rendered for `date`.
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(report_file_name(date))
    }

    /// Checks the settings needed to mail a report.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.recipient.trim().is_empty() {
            missing.push("recipient");
        }
        if self.smtp.host.trim().is_empty() {
            missing.push("smtp.host");
        }
        if self.smtp.username.trim().is_empty() {
            missing.push("smtp.username");
        }
        if self.smtp.password.is_empty() {
            missing.push("smtp.password");
        }
        if !missing.is_empty() {
            return Err(ReportError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        self.schedule().map(|_| ())
    }
}

/// Any scalar a provider may hand back for a text setting.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Unsigned(value) => value.to_string(),
            Scalar::Signed(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Bool(value) => value.to_string(),
        }
    }
}

/// Accepts `password = 123456` as well as `password = "123456"`.
fn text<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Scalar::deserialize(deserializer).map(|value| T::from(value.into_text()))
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer).map(|value| value.map(Scalar::into_text))
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/sales_data.csv")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_schedule_time() -> String {
    "06:00".to_string()
}
fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}
fn default_subject() -> String {
    "Daily Sales Report".to_string()
}
fn default_body() -> String {
    "Here is the daily sales report.".to_string()
}
fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}
fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}
fn default_smtp_timeout_secs() -> u64 {
    DEFAULT_SMTP_TIMEOUT_SECS
}
