//! Configuration for the TutorHub client.
//!
//! Settings live in an optional `tutorhub.json` (camelCase keys). A missing
//! file yields the defaults; the API URL may then be overridden from the
//! environment and finally from the command line.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tutorhub_gateway::{ClientOptions, Credentials, DEFAULT_BASE_URL};

use crate::error::{Result, SessionError};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "tutorhub.json";

/// Environment variable overriding `apiUrl`.
pub const API_URL_ENV: &str = "TUTORHUB_API_URL";

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

/// Default auto-submit countdown of the registration wizard.
const fn default_countdown_seconds() -> u32 {
    10
}

/// Default number of tutors per wizard page.
const fn default_tutor_page_size() -> usize {
    3
}

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Seconds before the wizard auto-submits a selected tutor.
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    /// Tutors shown per page in the wizard.
    #[serde(default = "default_tutor_page_size")]
    pub tutor_page_size: usize,

    /// Whether booking views fall back to built-in sample data.
    #[serde(default)]
    pub data_mode: DataMode,

    /// Optional basic-auth account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            countdown_seconds: default_countdown_seconds(),
            tutor_page_size: default_tutor_page_size(),
            data_mode: DataMode::default(),
            auth: None,
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON or
    /// invalid values.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            SessionError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads `tutorhub.json` from a specific directory.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load_from_file`].
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ConfigParseError` for unreadable files or
    /// invalid JSON, and `SessionError::ConfigValidationError` for invalid
    /// values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(SessionError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| SessionError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `api_url` when an override is given and non-blank.
    #[must_use]
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    /// Applies `TUTORHUB_API_URL` from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(SessionError::config_validation(
                "apiUrl must not be empty",
                format!("Set apiUrl in tutorhub.json or export {API_URL_ENV}"),
            ));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(SessionError::config_validation(
                format!("apiUrl '{}' must start with http:// or https://", self.api_url),
                "Use a full URL such as http://localhost:8081",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(SessionError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 in your tutorhub.json",
            ));
        }

        if self.countdown_seconds == 0 {
            return Err(SessionError::config_validation(
                "countdownSeconds must be greater than 0",
                "Set countdownSeconds to at least 1 in your tutorhub.json",
            ));
        }

        if self.tutor_page_size == 0 {
            return Err(SessionError::config_validation(
                "tutorPageSize must be greater than 0",
                "Set tutorPageSize to at least 1 in your tutorhub.json",
            ));
        }

        if let Some(auth) = &self.auth {
            if auth.username.trim().is_empty() {
                return Err(SessionError::config_validation(
                    "auth.username must not be empty",
                    "Provide a username or remove the auth block",
                ));
            }
            if auth.password_env.trim().is_empty() {
                return Err(SessionError::config_validation(
                    "auth.passwordEnv must not be empty",
                    "Name the environment variable that holds the password",
                ));
            }
        }

        Ok(())
    }

    /// Resolves the basic-auth credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` when `auth` is configured but the named
    /// variable is not set.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        self.credentials_with(|var| std::env::var(var).ok())
    }

    /// Resolves credentials through a custom variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` when the lookup yields nothing.
    pub fn credentials_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Credentials>> {
        let Some(auth) = &self.auth else {
            return Ok(None);
        };
        let password = lookup(&auth.password_env)
            .ok_or_else(|| SessionError::missing_credential(&auth.password_env))?;
        Ok(Some(Credentials::new(&auth.username, password)))
    }

    /// Builds gateway options from this configuration.
    ///
    /// # Errors
    ///
    /// Propagates credential resolution failures.
    pub fn client_options(&self) -> Result<ClientOptions> {
        let mut options = ClientOptions::new(&self.api_url)
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(credentials) = self.credentials()? {
            options = options.with_credentials(credentials);
        }
        Ok(options)
    }
}

/// Basic-auth account settings. The password itself is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Account name.
    pub username: String,
    /// Environment variable holding the password.
    pub password_env: String,
}

/// Data source policy for the booking views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataMode {
    /// Only backend data; failures show empty views.
    #[default]
    Live,
    /// Backend data, with built-in sample data after a failed fetch.
    Seeded,
}

impl DataMode {
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "live" => Some(Self::Live),
            "seeded" => Some(Self::Seeded),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for DataMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid data mode '{s}': expected one of 'live', 'seeded'"
            ))
        })
    }
}

impl Serialize for DataMode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            Self::Live => "live",
            Self::Seeded => "seeded",
        })
    }
}
