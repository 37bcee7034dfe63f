use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Auth token cannot be empty")]
    EmptyAuthToken,

    #[error("API and admin listeners cannot share {0}")]
    SameListener(String),
}

/// Split API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the evaluation API
    #[serde(default = "Listener::default_api")]
    pub listener: Listener,
    /// Listener for health and readiness probes
    #[serde(default = "Listener::default_admin")]
    pub admin_listener: Listener,
    /// Value the `Authorization` header must carry, compared verbatim
    pub auth_token: String,
    /// Backend computing the treatments
    pub evaluator: EvaluatorConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::SameListener(self.listener.address()));
        }

        if self.auth_token.trim().is_empty() {
            return Err(ValidationError::EmptyAuthToken);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    fn default_api() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 7548,
        }
    }

    fn default_admin() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 7549,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum EvaluatorConfig {
    /// Split definitions read from a local YAML or `.split` file
    Localhost { split_file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            listener: Listener::default_api(),
            admin_listener: Listener::default_admin(),
            auth_token: "secret".into(),
            evaluator: EvaluatorConfig::Localhost {
                split_file: "/etc/split/splits.yaml".into(),
            },
        }
    }

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 3000
admin_listener:
    host: "127.0.0.1"
    port: 3001
auth_token: secret
evaluator:
    type: localhost
    split_file: /etc/split/splits.yaml
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.admin_listener.address(), "127.0.0.1:3001");
        assert_eq!(config.auth_token, "secret");
        assert_eq!(
            config.evaluator,
            EvaluatorConfig::Localhost {
                split_file: "/etc/split/splits.yaml".into()
            }
        );
    }

    #[test]
    fn test_default_listeners() {
        let yaml = r#"
auth_token: secret
evaluator: {type: localhost, split_file: splits.split}
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config, {
            let mut expected = base_config();
            expected.evaluator = EvaluatorConfig::Localhost {
                split_file: "splits.split".into(),
            };
            expected
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = base_config();
        config.listener.port = 0;
        assert_eq!(config.validate().unwrap_err(), ValidationError::InvalidPort);

        let mut config = base_config();
        config.admin_listener.port = 0;
        assert_eq!(config.validate().unwrap_err(), ValidationError::InvalidPort);

        let mut config = base_config();
        config.auth_token = "  ".into();
        assert_eq!(
            config.validate().unwrap_err(),
            ValidationError::EmptyAuthToken
        );

        let mut config = base_config();
        config.admin_listener = config.listener.clone();
        assert_eq!(
            config.validate().unwrap_err(),
            ValidationError::SameListener("127.0.0.1:7548".into())
        );
    }

    #[test]
    fn test_deserialization_errors() {
        // Missing auth token
        assert!(
            serde_yaml::from_str::<Config>(
                "evaluator: {type: localhost, split_file: a.yaml}"
            )
            .is_err()
        );

        // Unknown evaluator type
        assert!(
            serde_yaml::from_str::<Config>(
                "auth_token: x\nevaluator: {type: redis, split_file: a.yaml}"
            )
            .is_err()
        );

        // Invalid port type
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: "not_a_number"}
auth_token: x
evaluator: {type: localhost, split_file: a.yaml}
"#
            )
            .is_err()
        );
    }
}
