use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Round failures. Every variant means "persist nothing for this round".
#[derive(Debug, Error)]
pub enum Error {
    #[error("no classified categories found in database for questions")]
    Configuration,
    #[error("unknown image {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::bb8::RunError),
}

impl Error {
    fn status(&self) -> Status {
        match self {
            Error::Configuration => Status::InternalServerError,
            Error::NotFound(_) => Status::NotFound,
            Error::Validation(_) => Status::UnprocessableEntity,
            Error::Database(_) | Error::Pool(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("request failed: {self}");
        }
        let body = serde_json::json!({ "detail": self.to_string() }).to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
