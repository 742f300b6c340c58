//! SOS alerts over the Twilio Messages API.
//!
//! Contacts and police stations come from the vehicle store. A failed send
//! to one contact is logged and skipped; the caller gets the number of
//! messages that went out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use veloce_core::emergency::{self, EmergencyNotifier, PoliceStation};
use veloce_core::environment::Coordinates;
use veloce_core::error::ProviderError;
use veloce_core::vehicle::VehicleStore;
use veloce_providers::http;

#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &"[REDACTED]")
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

pub struct TwilioNotifier {
    api_url: String,
    credentials: TwilioCredentials,
    store: Arc<dyn VehicleStore>,
    client: reqwest::Client,
}

impl TwilioNotifier {
    pub fn new(
        api_url: impl Into<String>,
        credentials: TwilioCredentials,
        store: Arc<dyn VehicleStore>,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
            store,
            client: http::client(15),
        }
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.api_url, self.credentials.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[
                ("To", to),
                ("From", self.credentials.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(http::transport_error)?;

        http::check_status("twilio", response).await?;
        Ok(())
    }
}

#[async_trait]
impl EmergencyNotifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send_alert(&self, location: &str, situation: &str) -> Result<usize, ProviderError> {
        let contacts = self
            .store
            .emergency_contacts()
            .await
            .map_err(|e| ProviderError::Dependency(e.to_string()))?;

        let body = emergency::sos_message(location, situation);
        let mut sent = 0;

        for contact in &contacts {
            match self.send_sms(&contact.phone_number, &body).await {
                Ok(()) => {
                    info!(contact = %contact.name, "SOS alert sent");
                    sent += 1;
                }
                Err(e) => {
                    warn!(contact = %contact.name, error = %e, "Failed to send SOS alert");
                }
            }
        }

        Ok(sent)
    }

    async fn nearest_station(
        &self,
        from: Coordinates,
    ) -> Result<Option<PoliceStation>, ProviderError> {
        let stations = self
            .store
            .police_stations()
            .await
            .map_err(|e| ProviderError::Dependency(e.to_string()))?;

        Ok(emergency::nearest_of(&stations, from).cloned())
    }
}
