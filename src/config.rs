use crate::error::ContactsError;
use crate::gate::GatePolicy;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Password the service historically fell back to when none was configured.
/// Refused at startup, never used.
pub const DEFAULT_ADMIN_PASSWORD: &str = "default-admin-password";

/// Environment variables parsed into typed values (lowercased by figment).
const TYPED_ENV_KEYS: &[&str] = &["auth_mode", "gate_policy", "database_url", "port", "loglevel"];

/// Environment variables taken verbatim: `0042`, `true` or `[x]` stay strings.
const RAW_ENV_KEYS: &[&str] = &[
    "admin_password",
    "admin_password_hash",
    "secret_header",
    "allowed_origin",
];

/// How presented credentials are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Plaintext secret, constant-time equality.
    Exact,
    /// bcrypt hash of the admin password.
    Hashed,
    /// No credential check; access is restricted by CORS origin.
    Open,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub auth_mode: AuthMode,
    pub gate_policy: GatePolicy,
    pub admin_password: Option<String>,
    pub admin_password_hash: Option<String>,
    /// Optional dedicated header carrying the secret, preferred over `Authorization`.
    pub secret_header: Option<String>,
    pub allowed_origin: Option<String>,
    pub database_url: String,
    pub port: u16,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_mode: AuthMode::Exact,
            gate_policy: GatePolicy::MethodExempt,
            admin_password: None,
            admin_password_hash: None,
            secret_header: None,
            allowed_origin: None,
            database_url: "sqlite:contacts.db".to_string(),
            port: 5000,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with process environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(TYPED_ENV_KEYS))
            .merge(Serialized::defaults(raw_env(RAW_ENV_KEYS)))
    }

    pub fn load() -> Result<Self, ContactsError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ContactsError> {
        let cfg: Config = figment.extract()?;
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

// `Env` as a provider parses values; its iterator yields the untouched strings.
fn raw_env(keys: &[&str]) -> BTreeMap<String, String> {
    Env::raw()
        .only(keys)
        .iter()
        .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
        .collect()
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_mode", &self.auth_mode)
            .field("gate_policy", &self.gate_policy)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field(
                "admin_password_hash",
                &self.admin_password_hash.as_ref().map(|_| "<redacted>"),
            )
            .field("secret_header", &self.secret_header)
            .field("allowed_origin", &self.allowed_origin)
            .field("database_url", &self.database_url)
            .field("port", &self.port)
            .field("loglevel", &self.loglevel)
            .finish()
    }
}
