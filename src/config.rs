use std::{env, time::Duration};
use url::Url;

/// Environment variable holding the referral domain.
pub const DOMAIN_ENV: &str = "EXTOLE_REFERRAL_DOMAIN";

/// Optional environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "EXTOLE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Possible issues while setting up a client.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no referral domain configured (set EXTOLE_REFERRAL_DOMAIN)")]
    MissingDomain,
    #[error("invalid referral domain {domain:?}: {source}")]
    InvalidDomain {
        domain: String,
        source: url::ParseError,
    },
    #[error("referral domain must use http or https, not {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid timeout {0:?}")]
    InvalidTimeout(String),
    #[error("unable to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Everything needed to talk to a single referral domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    referral_domain: String,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Validates the given referral domain, such as `https://refer.example.com`.
    ///
    /// API paths are appended verbatim, so a trailing slash is dropped here.
    pub fn new(referral_domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = referral_domain.into();
        let trimmed = domain.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingDomain);
        }

        let parsed = Url::parse(&trimmed).map_err(|source| ConfigError::InvalidDomain {
            domain: domain.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        Ok(Self {
            referral_domain: trimmed,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("extole-rust/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Reads the configuration from `EXTOLE_REFERRAL_DOMAIN` and,
    /// if present, `EXTOLE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let domain = env::var(DOMAIN_ENV).map_err(|_| ConfigError::MissingDomain)?;
        let config = Self::new(domain)?;

        // The timeout is optional, but if it is set it must be whole seconds.
        match env::var(TIMEOUT_ENV) {
            Ok(raw) => {
                let seconds: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                Ok(config.with_timeout(Duration::from_secs(seconds)))
            }
            Err(_) => Ok(config),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The referral domain, without a trailing slash.
    pub fn referral_domain(&self) -> &str {
        &self.referral_domain
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
