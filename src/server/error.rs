use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json
};
use log::error;

use smokefree::Notification;

/// A request that could not be served at all.
///
/// The body has the shape of an error `Notification`, so the pages can toast
/// it the same way as a failed store write.
pub(crate) enum ServerError {
    /// Input the dashboard never saw, e.g. an unparsable date
    BadRequest(String),
    Internal(anyhow::Error)
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg) => msg,
            Self::Internal(err) => {
                error!("request failed: {:#}", err);
                format!("Something went wrong: {}", err)
            }
        };
        (status, Json(Notification::Error(message))).into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

pub(crate) type ServerResult<T> = Result<T, ServerError>;
