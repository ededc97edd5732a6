use std::path::Path;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::{setup_uri::SetupUri, UntisError};

pub const DEFAULT_SERVER: &str = "arche.webuntis.com";
pub const DEFAULT_CLIENT_VERSION: &str = "i3.45.1";
const ENV_PREFIX: &str = "UNTIS";

#[derive(Deserialize, Clone, PartialEq)]
pub struct UntisConfig {
    pub username: String,
    pub secret: String,
    pub school: String,
    pub server: String,
    pub client_version: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for UntisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UntisConfig")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("school", &self.school)
            .field("server", &self.server)
            .field("client_version", &self.client_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Values that take precedence over the file and the environment,
/// typically command line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub secret: Option<String>,
    pub school: Option<String>,
    pub server: Option<String>,
}

impl ConfigOverrides {
    /// Fills every field not set yet from a setup URI.
    pub fn with_setup_uri(mut self, setup: SetupUri) -> Self {
        self.username.get_or_insert(setup.user);
        self.secret.get_or_insert(setup.secret);
        self.school.get_or_insert(setup.school);
        self.server.get_or_insert(setup.server);

        self
    }
}

impl UntisConfig {
    /// Creates a config with the default server settings.
    pub fn new(username: &str, secret: &str, school: &str) -> Self {
        Self {
            username: username.to_string(),
            secret: secret.to_string(),
            school: school.to_string(),
            server: DEFAULT_SERVER.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }

    /// Loads the config from, in increasing precedence: built-in defaults,
    /// the optional file at `path`, `UNTIS__*` environment variables and
    /// `overrides`.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, UntisError> {
        let mut builder = Config::builder()
            .set_default("server", DEFAULT_SERVER)
            .and_then(|b| b.set_default("client_version", DEFAULT_CLIENT_VERSION))
            .and_then(|b| b.set_default("request_timeout_secs", 30))
            .and_then(|b| b.set_default("connect_timeout_secs", 10))
            .map_err(UntisError::Config)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("username", overrides.username)
            .and_then(|b| b.set_override_option("secret", overrides.secret))
            .and_then(|b| b.set_override_option("school", overrides.school))
            .and_then(|b| b.set_override_option("server", overrides.server))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(UntisError::Config)?;

        Ok(config)
    }
}
