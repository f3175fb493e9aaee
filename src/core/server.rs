// Authors: Robert Lopez

use super::{credentials::UploadCredentials, issuer::PresignedPostIssuer};
use crate::error::Error;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

pub const SIGNED_POST_PATH: &str = "/signed-post";

/// Error returned from handlers, logged and answered with a bare 500.
pub struct ServerError(Error);

impl From<Error> for ServerError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "failed to issue presigned post");

        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

async fn signed_post(
    State(issuer): State<Arc<PresignedPostIssuer>>,
) -> Result<Json<UploadCredentials>, ServerError> {
    let key = Uuid::new_v4().to_string();

    Ok(Json(issuer.create_presigned_post(&key).await?))
}

/// Router serving `GET /signed-post`, each call issuing credentials
/// for a fresh random object key.
pub fn router(issuer: Arc<PresignedPostIssuer>) -> Router {
    Router::new()
        .route(SIGNED_POST_PATH, get(signed_post))
        .with_state(issuer)
}

/// Serves the signed post endpoint on `listener` until the process exits.
pub async fn serve(listener: TcpListener, issuer: Arc<PresignedPostIssuer>) -> Result<(), Error> {
    info!(addr = ?listener.local_addr()?, "serving signed post endpoint");

    axum::serve(listener, router(issuer)).await?;

    Ok(())
}
