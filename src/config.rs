//! Client configuration, read from flags and the environment.

use crate::domain::traveler::{Session, UserProfile};
use crate::infrastructure::http::RestConfig;
use clap::Args;
use std::time::Duration;

/// Where the booking API lives and who is calling it.
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Booking API root URL. Without one the built-in sandbox is used.
    #[arg(long, env = "TOURCART_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token of the logged-in user.
    #[arg(long, env = "TOURCART_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "TOURCART_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Merchant name shown in the payment widget.
    #[arg(long, env = "TOURCART_MERCHANT", default_value = "Tripzybee")]
    pub merchant: String,

    #[command(flatten)]
    pub profile: ProfileConfig,
}

/// The user's own details, used to prefill traveler forms and the payment widget.
#[derive(Debug, Args)]
pub struct ProfileConfig {
    #[arg(long = "user-name", env = "TOURCART_USER_NAME", default_value = "")]
    pub name: String,

    #[arg(long = "user-email", env = "TOURCART_USER_EMAIL", default_value = "")]
    pub email: String,

    #[arg(long = "user-phone", env = "TOURCART_USER_PHONE", default_value = "")]
    pub phone: String,
}

impl ClientConfig {
    /// Settings for the REST client, or `None` when running against the sandbox.
    pub fn rest(&self) -> Option<RestConfig> {
        let base_url = self.api_url.as_deref()?.trim();
        if base_url.is_empty() {
            return None;
        }
        Some(RestConfig {
            base_url: base_url.to_string(),
            token: self.token.clone().filter(|token| !token.trim().is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    pub fn session(&self) -> Session {
        Session::new(UserProfile {
            name: self.profile.name.clone(),
            email: self.profile.email.clone(),
            phone: self.profile.phone.clone(),
            emergency_contact: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: ClientConfig,
    }

    #[test]
    fn test_blank_url_means_sandbox() {
        let harness = Harness::parse_from(["tourcart", "--api-url", "  "]);
        assert!(harness.config.rest().is_none());
    }

    #[test]
    fn test_rest_config_from_flags() {
        let harness = Harness::parse_from([
            "tourcart",
            "--api-url",
            "https://api.example.com/api",
            "--token",
            "abc",
            "--timeout-secs",
            "5",
            "--user-name",
            "Asha Rao",
        ]);
        let rest = harness.config.rest().unwrap();
        assert_eq!(rest.base_url, "https://api.example.com/api");
        assert_eq!(rest.token.as_deref(), Some("abc"));
        assert_eq!(rest.timeout, Duration::from_secs(5));
        assert_eq!(harness.config.session().profile.name, "Asha Rao");
    }
}
