//! Bearer token gate for incoming requests.
//!
//! Every request runs its own decision: no token, a token that verifies, or a
//! token that doesn't. What happens with a missing token depends on the
//! [`Requirement`] of the route, expressed by using either [`RequiredAuth`]
//! or [`OptionalAuth`] as an extractor.

use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request, HeaderValue, StatusCode},
};

use crate::{
	error::{self, ErrorShape},
	openapi::SECURITY_SCHEME_BEARER,
	token::{Audience, AuthPayload, Verifier},
};

/// Matched case-insensitively.
pub const AUTHORIZATION_SCHEME: &str = "Bearer";

/// An error that rejects a request at the gate.
///
/// Verifier details are dropped, so every bad token looks the same.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("access token required")]
	TokenRequired,
	#[error("access token not valid")]
	TokenInvalid,
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		StatusCode::UNAUTHORIZED
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		error::Message::new(self.to_string()).into_vec()
	}
}

pub type RouteError = error::RouteError<Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
	Required,
	Optional,
}

/// The identity a request carries past the gate.
///
/// Inserted into the request extensions for anything running after the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
	Anonymous,
	Authenticated { payload: AuthPayload, token: String },
}

impl AuthContext {
	pub fn payload(&self) -> Option<&AuthPayload> {
		match self {
			Self::Anonymous => None,
			Self::Authenticated { payload, .. } => Some(payload),
		}
	}
}

/// What the `Authorization` header holds.
enum Credential<'a> {
	Missing,
	Present(&'a str),
	Malformed,
}

impl<'a> Credential<'a> {
	fn from_header(value: Option<&'a HeaderValue>) -> Self {
		let Some(value) = value else {
			return Self::Missing;
		};

		let Ok(value) = value.to_str() else {
			return Self::Malformed;
		};

		let value = value.trim();

		if value.is_empty() {
			return Self::Missing;
		}

		let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));

		if !scheme.eq_ignore_ascii_case(AUTHORIZATION_SCHEME) {
			return Self::Malformed;
		}

		match token.trim() {
			"" => Self::Missing,
			token => Self::Present(token),
		}
	}
}

/// Runs the gate for one request.
pub fn authorize(
	header: Option<&HeaderValue>,
	verifier: &Verifier,
	requirement: Requirement,
) -> Result<AuthContext, Error> {
	match Credential::from_header(header) {
		Credential::Missing => match requirement {
			Requirement::Required => Err(Error::TokenRequired),
			Requirement::Optional => Ok(AuthContext::Anonymous),
		},
		Credential::Malformed => Err(Error::TokenInvalid),
		Credential::Present(token) => match verifier.verify(token, Audience::User) {
			Ok(payload) => Ok(AuthContext::Authenticated {
				payload,
				token: token.to_owned(),
			}),
			Err(error) => {
				tracing::debug!(%error, "rejected access token");

				Err(Error::TokenInvalid)
			}
		},
	}
}

fn authorize_parts<S>(
	parts: &mut request::Parts,
	state: &S,
	requirement: Requirement,
) -> Result<AuthContext, Error>
where
	Verifier: FromRef<S>,
{
	let verifier = Verifier::from_ref(state);
	let context = authorize(
		parts.headers.get(header::AUTHORIZATION),
		&verifier,
		requirement,
	)?;

	parts.extensions.insert(context.clone());

	Ok(context)
}

/// Requires a valid bearer token.
///
/// Missing tokens are rejected with [`Error::TokenRequired`] and invalid ones
/// with [`Error::TokenInvalid`].
///
/// ```rust
/// async fn route(auth: RequiredAuth) {
///   println!("{}", auth.payload.user_id);
/// }
/// ```
#[derive(Debug)]
pub struct RequiredAuth {
	pub payload: AuthPayload,
	pub token: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequiredAuth
where
	Verifier: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		match authorize_parts(parts, state, Requirement::Required)? {
			AuthContext::Authenticated { payload, token } => Ok(Self { payload, token }),
			AuthContext::Anonymous => Err(Error::TokenRequired.into()),
		}
	}
}

/// Accepts anonymous requests, but still rejects invalid tokens.
#[derive(Debug)]
pub struct OptionalAuth(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
	Verifier: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self(authorize_parts(parts, state, Requirement::Optional)?))
	}
}

fn bearer_security(operation: &mut aide::openapi::Operation) {
	operation.security.push(
		[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
			.into_iter()
			.collect(),
	);
}

impl OperationInput for RequiredAuth {
	/// Adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		bearer_security(operation);
	}
}

impl OperationInput for OptionalAuth {
	/// Documents the bearer token, and that it may be left out.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		bearer_security(operation);
		operation.security.push(aide::openapi::SecurityRequirement::default());
	}
}
