use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Field subset retained from the geolocation lookup response. Everything
/// else the service returns is dropped on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeoInfo {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub org: Option<String>,
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_exposed_field_subset() {
        let payload = serde_json::json!({
            "ip": "203.0.113.5",
            "network": "203.0.113.0/24",
            "version": "IPv4",
            "city": "Jakarta",
            "region": "Jakarta",
            "region_code": "JK",
            "country": "ID",
            "country_name": "Indonesia",
            "country_code": "ID",
            "latitude": -6.2146,
            "longitude": 106.8451,
            "timezone": "Asia/Jakarta",
            "utc_offset": "+0700",
            "org": "EXAMPLE-NET",
            "asn": "AS64496"
        });

        let geo: GeoInfo = serde_json::from_value(payload).expect("geo payload");
        assert_eq!(geo.country_name.as_deref(), Some("Indonesia"));
        assert_eq!(geo.latitude, Some(-6.2146));

        let reserialized = serde_json::to_value(&geo).expect("reserialized");
        assert!(reserialized.get("network").is_none());
        assert_eq!(reserialized["city"], "Jakarta");
    }

    #[test]
    fn tolerates_missing_fields() {
        let geo: GeoInfo =
            serde_json::from_value(serde_json::json!({ "ip": "203.0.113.5" })).expect("payload");
        assert!(geo.country_name.is_none());
        assert!(geo.latitude.is_none());
    }
}
