//! [`User`]-related REST API definitions.
//!
//! [`User`]: service::domain::User

use axum::{Extension, Json};
use http::StatusCode;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::User,
};

use crate::{AsError, Error, Service};

use super::parse;

/// Request of the [`register`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
    /// Name of the new account.
    pub name: String,

    /// Email of the new account.
    pub email: String,

    /// Password of the new account.
    pub password: String,

    /// Phone number of the new account.
    pub phone: Option<String>,
}

/// Wire representation of a [`User`].
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// ID of the account.
    pub id: String,

    /// Name of the account.
    pub name: String,

    /// Email of the account.
    pub email: String,

    /// Role of the account.
    pub role: String,

    /// Phone number of the account.
    pub phone: Option<String>,

    /// When the account was created.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            phone: user.phone.as_ref().map(ToString::to_string),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Registers a new account.
///
/// # Errors
///
/// If the request is malformed or the email is occupied.
pub async fn register(
    Extension(service): Extension<Service>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
    } = req;

    let user = service
        .execute(command::CreateUser {
            name: parse(&name, "name")?,
            email: parse(&email, "email")?,
            password: SecretBox::new(Box::new(parse(&password, "password")?)),
            phone: phone.as_deref().map(|p| parse(p, "phone")).transpose()?,
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Request of the [`login`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Email of the account.
    pub email: String,

    /// Password of the account.
    pub password: String,
}

/// Response of the [`login`] handler.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer token of the created session.
    pub token: String,

    /// When the session expires.
    pub expires_at: String,

    /// Account the session belongs to.
    pub user: UserResponse,
}

/// Creates a new session by account credentials.
///
/// # Errors
///
/// If the credentials are wrong.
pub async fn login(
    Extension(service): Extension<Service>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, Error> {
    let LoginRequest { email, password } = req;

    let out = service
        .execute(command::CreateSession {
            email: parse(&email, "email")?,
            password: SecretBox::new(Box::new(parse(&password, "password")?)),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(SessionResponse {
        token: out.token.to_string(),
        expires_at: out.expires_at.to_rfc3339(),
        user: UserResponse::from(&out.user),
    }))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        let status = match self {
            Self::Db(e) => return e.try_as_error(),
            Self::EmailOccupied(_) => http::StatusCode::CONFLICT,
        };
        Some(Error {
            code: "EMAIL_OCCUPIED",
            status_code: status,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for command::create_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => Some(Error {
                code: "WRONG_CREDENTIALS",
                status_code: http::StatusCode::UNAUTHORIZED,
                message: self.to_string(),
                backtrace: None,
            }),
        }
    }
}
