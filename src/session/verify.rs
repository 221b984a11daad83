//! Backend check that a cached user still exists.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::SessionError;
use crate::models::User;

#[derive(Clone)]
pub struct UserVerifier {
    client: Client,
    base_url: Url,
}

impl UserVerifier {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, SessionError> {
        let client = Client::builder()
            .user_agent(concat!("litterlog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Self::with_client(client, backend_url)
    }

    pub fn with_client(client: Client, backend_url: &str) -> Result<Self, SessionError> {
        let base_url = Url::parse(backend_url)?;
        Ok(Self { client, base_url })
    }

    /// `{backend}/users/checkuser/{email}`, with the email percent-encoded.
    pub fn check_url(&self, email: &str) -> Result<Url, SessionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SessionError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["users", "checkuser", email]);
        Ok(url)
    }

    /// `true` only when the backend answers 2xx. Transport failures count as
    /// rejection.
    pub async fn verify(&self, user: &User) -> bool {
        let url = match self.check_url(&user.email) {
            Ok(url) => url,
            Err(e) => {
                warn!(kind = "invalid_input", error = %e, "Cannot build user check URL");
                return false;
            }
        };

        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(email = %user.email, "Cached user accepted");
                true
            }
            Ok(response) => {
                warn!(
                    kind = "status",
                    status = response.status().as_u16(),
                    email = %user.email,
                    "Cached user rejected by backend"
                );
                false
            }
            Err(e) => {
                warn!(kind = "transport", email = %user.email, error = %e, "User check failed");
                false
            }
        }
    }
}
