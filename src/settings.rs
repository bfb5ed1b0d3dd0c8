//! Environment-driven connection settings.
//!
//! Credentials and endpoints come from the environment so they never appear
//! on the command line or in shell history.

use std::env;

/// Errors raised while assembling connection settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("environment variable {name} is not set")]
    Missing { name: String },
}

/// Connection coordinates for the lab API and the lab host shell.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the management API, e.g. `https://eve.example/api`.
    pub api_url: String,
    pub api_user: String,
    pub api_password: String,
    /// Address of the host running the bridges; often the same machine the
    /// API lives on.
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_password: String,
}

fn required(name: &str) -> Result<String, SettingsError> {
    env::var(name).map_err(|_| SettingsError::Missing {
        name: name.to_string(),
    })
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Settings {
            api_url: required("EVE_URL")?,
            api_user: required("EVE_HTTP_USER")?,
            api_password: required("EVE_HTTP_PASS")?,
            ssh_host: required("EVE_SSH_HOST")?,
            ssh_user: required("EVE_SSH_USER")?,
            ssh_password: required("EVE_SSH_PASS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_is_named() {
        let err = required("EVELINK_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("EVELINK_TEST_UNSET_VARIABLE"));
    }
}
