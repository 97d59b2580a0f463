use secrecy::SecretString;

use crate::client::consts::{BRIDGE_TOKEN, BRIDGE_URL, DEFAULT_URL};

/// Where the assistant bridge listens and how to authenticate against it.
#[derive(Debug)]
pub struct Config {
    url: String,
    token: Option<SecretString>,
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.config.token = Some(SecretString::from(token.to_string()));
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    // Defaults come from the environment; an unset token means no auth header.
    pub fn new() -> Self {
        Self {
            url: std::env::var(BRIDGE_URL).unwrap_or_else(|_| DEFAULT_URL.to_string()),
            token: std::env::var(BRIDGE_TOKEN)
                .ok()
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn builder_overrides_url_and_token() {
        let config = Config::builder()
            .with_url("ws://10.0.0.5:9000")
            .with_token("s3cret")
            .build();
        assert_eq!(config.url(), "ws://10.0.0.5:9000");
        assert_eq!(config.token().unwrap().expose_secret(), "s3cret");
    }

    #[test]
    fn token_is_not_leaked_by_debug() {
        let config = Config::builder().with_token("s3cret").build();
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
