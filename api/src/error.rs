use axum::http::StatusCode;
use axum::response::IntoResponse;

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError(anyhow::Error),
}

impl From<sqlx::error::Error> for ApiError {
    fn from(e: sqlx::error::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            _ => Self::InternalServerError(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            // The persistence write is the whole point of the endpoint that
            // produces this error, so the detail goes out with the status.
            ApiError::InternalServerError(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")).into_response()
            }
        }
    }
}
