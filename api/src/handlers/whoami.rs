use crate::State;
use crate::ip_address::ResolvedClient;
use axum::{Extension, Json};
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use models::whoami::WhoamiResponse;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/json",
    responses(
        (status = 200, description = "Resolved client IP with optional geolocation", body = WhoamiResponse),
    )
)]
pub async fn whoami(
    client: ResolvedClient,
    user_agent: Option<TypedHeader<UserAgent>>,
    Extension(state): Extension<State>,
) -> Json<WhoamiResponse> {
    debug!(
        "Resolved client IP {} (valid: {})",
        client.ip, client.ip_is_valid
    );

    // Strings that don't parse never reach the geolocation service.
    let geo = if client.ip_is_valid {
        state.geo.lookup(&client.ip).await
    } else {
        None
    };

    Json(WhoamiResponse {
        ip: client.ip,
        ip_is_valid: client.ip_is_valid,
        geo,
        user_agent: user_agent.map(|TypedHeader(user_agent)| user_agent.to_string()),
    })
}
