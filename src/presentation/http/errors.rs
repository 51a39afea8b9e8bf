use poem::http::StatusCode;

use crate::domain::errors::{DomainError, ErrorKind};

pub fn to_http_error(err: DomainError) -> poem::Error {
    let status = match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Eligibility => StatusCode::FORBIDDEN,
        ErrorKind::Provider => StatusCode::BAD_GATEWAY,
        ErrorKind::State => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    poem::Error::from_string(err.to_string(), status)
}
