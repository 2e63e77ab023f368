//! Firm (tenant) context extracted from request headers.
//!
//! The BFF authenticates the caller and forwards the firm, user and role as
//! headers. Services trust these headers and never see tokens.

use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FIRM_ID_HEADER: &str = "X-Firm-ID";
pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Role of the caller within a firm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Client,
    Ca,
    FirmAdmin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Client => "client",
            ActorRole::Ca => "ca",
            ActorRole::FirmAdmin => "firm_admin",
        }
    }

    /// CA staff and firm admins act on behalf of the firm.
    pub fn is_staff(&self) -> bool {
        matches!(self, ActorRole::Ca | ActorRole::FirmAdmin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(ActorRole::Client),
            "ca" => Ok(ActorRole::Ca),
            "firm_admin" | "admin" => Ok(ActorRole::FirmAdmin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FirmContext {
    pub firm_id: String,
    pub user_id: String,
    pub role: ActorRole,
}

impl FirmContext {
    pub fn new(firm_id: impl Into<String>, user_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            firm_id: firm_id.into(),
            user_id: user_id.into(),
            role,
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role {} cannot perform this action",
                self.role
            )))
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for FirmContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let firm_id = header(parts, FIRM_ID_HEADER)?;
        let user_id = header(parts, USER_ID_HEADER)?;
        let role: ActorRole = header(parts, USER_ROLE_HEADER)?
            .parse()
            .map_err(|e: String| AppError::Forbidden(anyhow::anyhow!(e)))?;

        let span = tracing::Span::current();
        span.record("firm_id", firm_id);
        span.record("user_id", user_id);

        Ok(FirmContext::new(firm_id, user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("CA".parse::<ActorRole>().unwrap(), ActorRole::Ca);
        assert_eq!("firm_admin".parse::<ActorRole>().unwrap(), ActorRole::FirmAdmin);
        assert!("auditor".parse::<ActorRole>().is_err());
    }

    #[test]
    fn clients_are_not_staff() {
        let ctx = FirmContext::new("firm-1", "user-1", ActorRole::Client);
        assert!(matches!(ctx.require_staff(), Err(AppError::Forbidden(_))));
    }
}
