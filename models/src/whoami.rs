use crate::geo::GeoInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Response of `/` and `/json`: the resolved client IP plus the filtered
/// geolocation subset when the address could be looked up.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WhoamiResponse {
    pub ip: String,
    pub ip_is_valid: bool,
    pub geo: Option<GeoInfo>,
    pub user_agent: Option<String>,
}

/// Response of `/myip`: the lookup body is passed through unfiltered.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyIpResponse {
    pub ip: String,
    #[schema(value_type = Object)]
    pub location: Option<Value>,
}
