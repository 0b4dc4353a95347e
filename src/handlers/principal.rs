use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::principal::{Principal, Role};
use crate::errors::AppError;

/// Set by the upstream session layer once the caller is authenticated.
pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, AppError> {
    req.headers()
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {}", name)))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("malformed {}", name)))
}

pub fn principal_from_request(req: &HttpRequest) -> Result<Principal, AppError> {
    let id = Uuid::parse_str(header(req, USER_ID_HEADER)?)
        .map_err(|_| AppError::Unauthorized(format!("malformed {}", USER_ID_HEADER)))?;
    let role: Role = header(req, USER_ROLE_HEADER)?
        .parse()
        .map_err(|_| AppError::Unauthorized(format!("unknown {}", USER_ROLE_HEADER)))?;
    Ok(Principal::new(id, role))
}

impl FromRequest for Principal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(principal_from_request(req))
    }
}
