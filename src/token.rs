use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

/// Clock skew tolerated when checking `exp`, in seconds.
const LEEWAY: u64 = 30;

pub type Verifier = Arc<dyn TokenVerifier>;

/// Which family of tokens a credential belongs to. Each audience is signed
/// with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
	User,
}

impl Audience {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Admin,
}

/// The claims carried by a signed token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	pub sub: Uuid,
	pub role: Role,
	pub aud: String,
	pub iat: i64,
	pub exp: i64,
}

/// The identity decoded from a valid token. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
	pub user_id: Uuid,
	pub role: Role,
}

impl From<Claims> for AuthPayload {
	fn from(claims: Claims) -> Self {
		Self {
			user_id: claims.sub,
			role: claims.role,
		}
	}
}

/// Any failure to validate a token. Callers never see why.
#[derive(Debug, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidTokenError(#[source] jsonwebtoken::errors::Error);

pub trait TokenVerifier: Send + Sync {
	fn verify(&self, token: &str, audience: Audience) -> Result<AuthPayload, InvalidTokenError>;
}

/// Verifies HS256 tokens against the configured per-audience secret.
pub struct JwtVerifier {
	user: DecodingKey,
}

impl JwtVerifier {
	pub fn new(config: &JwtConfig) -> Self {
		Self {
			user: DecodingKey::from_secret(config.secret(Audience::User)),
		}
	}

	fn key(&self, audience: Audience) -> &DecodingKey {
		match audience {
			Audience::User => &self.user,
		}
	}
}

impl TokenVerifier for JwtVerifier {
	fn verify(&self, token: &str, audience: Audience) -> Result<AuthPayload, InvalidTokenError> {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = LEEWAY;
		validation.set_audience(&[audience.as_str()]);

		let data = decode::<Claims>(token, self.key(audience), &validation).map_err(InvalidTokenError)?;

		Ok(data.claims.into())
	}
}
