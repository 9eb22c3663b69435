use models::geo::GeoInfo;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Client for the lookup-by-IP geolocation service. Lookups degrade to
/// `None` on any failure; callers never see an error and never retry.
#[derive(Clone, Debug)]
pub struct GeoClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(base_url: &str) -> anyhow::Result<GeoClient> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(GeoClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Looks up `ip`, keeping only the fields the whoami response exposes.
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        self.fetch(ip).await
    }

    /// The lookup body exactly as the service returned it.
    pub async fn lookup_raw(&self, ip: &str) -> Option<Value> {
        self.fetch(ip).await
    }

    async fn fetch<T: DeserializeOwned>(&self, ip: &str) -> Option<T> {
        let url = format!("{}/{}/json/", self.base_url, ip);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Geolocation lookup for {} failed: {}", ip, err);
                return None;
            }
        };

        if let Err(err) = response.error_for_status_ref() {
            warn!(
                "Geolocation service returned an error status for {}: {}",
                ip, err
            );
            return None;
        }

        match response.json::<T>().await {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("Failed to parse geolocation response for {}: {}", ip, err);
                None
            }
        }
    }
}
