//! Client for the automation backend's availability webhook.

use chrono::NaiveDate;
use padelbook_common::models::AvailableSlot;
use padelbook_common::{create_client, PadelbookError, HTTP_CLIENT};
use padelbook_config::AvailabilityConfig;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

const UPCOMING: &str = "upcoming";

#[derive(Serialize)]
struct SlotsRequest {
    date: String,
}

#[derive(Debug, Clone)]
pub struct AvailabilityClient {
    client: Client,
    webhook_url: String,
}

impl AvailabilityClient {
    pub fn from_config(config: &AvailabilityConfig) -> Result<Self, PadelbookError> {
        if config.webhook_url.trim().is_empty() {
            return Err(PadelbookError::ConfigError(
                "availability webhook_url is empty".to_string(),
            ));
        }
        let client = match config.timeout_secs {
            Some(secs) => create_client(secs)?,
            None => HTTP_CLIENT.clone(),
        };
        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// All slots the club publishes for `date`, every court and status.
    pub async fn fetch_slots(&self, date: NaiveDate) -> Result<Vec<AvailableSlot>, PadelbookError> {
        let body = SlotsRequest {
            date: date.format("%Y-%m-%d").to_string(),
        };
        debug!("Fetching available slots for {}", body.date);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Availability webhook request failed: {}", e);
                PadelbookError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Availability webhook answered {}", status);
            return Err(PadelbookError::ExternalServiceError {
                service_name: "availability".to_string(),
                message: format!("webhook answered {}", status),
            });
        }

        let slots: Vec<AvailableSlot> = response.json().await.map_err(|e| {
            error!("Failed to decode available slots: {}", e);
            PadelbookError::from(e)
        })?;
        debug!("Received {} slots for {}", slots.len(), body.date);
        Ok(slots)
    }
}

/// Start times of the upcoming slots of one court, sorted.
pub fn upcoming_start_times(slots: &[AvailableSlot], external_id: &str) -> Vec<String> {
    let mut starts: Vec<String> = slots
        .iter()
        .filter(|s| s.court_id == external_id && s.status == UPCOMING)
        .map(|s| s.start_time.clone())
        .collect();
    starts.sort();
    starts
}
