use crate::State;
use crate::error::ApiError;
use crate::ip_address::ResolvedClient;
use crate::verification::VerificationRecord;
use axum::Extension;
use axum::extract::Path;
use axum::response::Html;
use tracing::{debug, error};

#[utoipa::path(
    get,
    path = "/verify/{member_id}",
    params(
        ("member_id" = String, Path, description = "External member identifier"),
    ),
    responses(
        (status = 200, description = "Verification recorded; HTML fragment reports the outcome", body = String),
        (status = 500, description = "Failed to persist the verification record", body = String),
    )
)]
pub async fn verify(
    Path(member_id): Path<String>,
    client: ResolvedClient,
    Extension(state): Extension<State>,
) -> Result<Html<String>, ApiError> {
    let geo = if client.ip_is_valid {
        state.geo.lookup(&client.ip).await
    } else {
        None
    };

    let record = VerificationRecord::build(
        member_id,
        &client,
        geo.as_ref(),
        &state.config.target_country,
    );

    debug!(
        "Verification for {}: ip={} country={:?} verified={}",
        record.discord_id, record.ip, record.country_name, record.verified
    );

    record.insert(&state.pool).await.map_err(|err| {
        error!("Failed to persist verification record: {err}");
        ApiError::from(err)
    })?;

    Ok(Html(render_outcome(record.verified)))
}

fn render_outcome(verified: bool) -> String {
    if verified {
        "<div class=\"verification success\">\
         <h2>Verification passed</h2>\
         <p>Welcome! Your country has been verified.</p>\
         </div>"
            .to_string()
    } else {
        "<div class=\"verification failure\">\
         <h2>Verification failed</h2>\
         <p>We could not verify your country from this connection.</p>\
         </div>"
            .to_string()
    }
}
