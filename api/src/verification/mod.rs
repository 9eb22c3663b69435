use crate::ip_address::ResolvedClient;
use models::geo::GeoInfo;
use sqlx::MySqlPool;

/// Persisted outcome of a single verification request. Written exactly once,
/// never read back or updated by this service.
#[derive(Debug)]
pub struct VerificationRecord {
    pub discord_id: String,
    pub ip: String,
    pub country_name: Option<String>,
    pub ip_is_valid: bool,
    pub verified: bool,
}

impl VerificationRecord {
    /// `verified` holds iff the IP parsed and the resolved country matches
    /// the configured target, case-insensitively.
    pub fn build(
        discord_id: String,
        client: &ResolvedClient,
        geo: Option<&GeoInfo>,
        target_country: &str,
    ) -> VerificationRecord {
        let country_name = geo.and_then(|geo| geo.country_name.clone());
        let verified = client.ip_is_valid
            && country_name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(target_country));

        VerificationRecord {
            discord_id,
            ip: client.ip.clone(),
            country_name,
            ip_is_valid: client.ip_is_valid,
            verified,
        }
    }

    pub async fn insert(&self, pool: &MySqlPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO verification (discord_id, ip, country_name, ip_is_valid, verified)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&self.discord_id)
        .bind(&self.ip)
        .bind(&self.country_name)
        .bind(self.ip_is_valid)
        .bind(self.verified)
        .execute(pool)
        .await?;

        Ok(())
    }
}
