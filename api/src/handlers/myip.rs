use crate::State;
use crate::ip_address::ResolvedClient;
use axum::{Extension, Json};
use models::whoami::MyIpResponse;

#[utoipa::path(
    get,
    path = "/myip",
    responses(
        (status = 200, description = "Resolved client IP with the raw geolocation lookup response", body = MyIpResponse),
    )
)]
pub async fn myip(client: ResolvedClient, Extension(state): Extension<State>) -> Json<MyIpResponse> {
    // Unfiltered passthrough, attempted for whatever string resolution produced.
    let location = state.geo.lookup_raw(&client.ip).await;

    Json(MyIpResponse {
        ip: client.ip,
        location,
    })
}
