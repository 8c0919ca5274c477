//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use core_kernel::{Actor, EmployeeId, SystemRole};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (employee ID)
    pub sub: String,
    /// Role names, e.g. `payroll_specialist`
    pub roles: Vec<String>,
    /// Display name, used to address the user in chatbot replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl TokenClaims {
    /// Resolves the acting user; unrecognised role names are dropped
    pub fn to_actor(&self) -> Result<Actor, AuthError> {
        let employee_id: EmployeeId = self
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))?;

        let roles = self
            .roles
            .iter()
            .filter_map(|name| match name.parse::<SystemRole>() {
                Ok(role) => Some(role),
                Err(_) => {
                    warn!(role = %name, "Ignoring unknown role in token");
                    None
                }
            })
            .collect();

        let actor = Actor::new(employee_id, roles);
        Ok(match &self.name {
            Some(name) => actor.with_name(name.clone()),
            None => actor,
        })
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject is not an employee id: {0}")]
    InvalidSubject(String),
    #[error("This action requires the {0} role")]
    MissingRole(SystemRole),
}

/// Creates a signed token for an actor
pub fn create_token(actor: &Actor, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = TokenClaims {
        sub: actor.employee_id.as_uuid().to_string(),
        roles: actor.roles.iter().map(|r| r.as_str().to_string()).collect(),
        name: actor.name.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, AuthError> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Fails unless the actor holds `role` (admins hold every role)
pub fn require_role(actor: &Actor, role: SystemRole) -> Result<(), AuthError> {
    if actor.has_role(role) {
        Ok(())
    } else {
        Err(AuthError::MissingRole(role))
    }
}
