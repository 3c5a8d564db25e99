//! HTTP Basic authentication.
//!
//! Handlers that take an [`Authenticated`] argument only run for requests
//! whose `Authorization: Basic ...` header names a known customer with the
//! right password. Authorization (roles, permissions) is left to the engine.

use crate::error::ApiError;
use crate::server::AppState;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use base64::prelude::*;
use pizzeria_core::{OrderError, RequestContext};

/// The request context of an authenticated caller.
pub struct Authenticated(pub RequestContext);

/// Splits a `Basic` authorization header value into username and password.
fn parse_basic(value: &str) -> Result<(String, String), ApiError> {
	let encoded = value
		.strip_prefix("Basic ")
		.ok_or_else(|| ApiError::Unauthorized("Expected Basic credentials".into()))?;
	let decoded = BASE64_STANDARD
		.decode(encoded.trim())
		.map_err(|_| ApiError::Unauthorized("Malformed credentials".into()))?;
	let decoded = String::from_utf8(decoded)
		.map_err(|_| ApiError::Unauthorized("Malformed credentials".into()))?;
	let (username, password) = decoded
		.split_once(':')
		.ok_or_else(|| ApiError::Unauthorized("Malformed credentials".into()))?;
	Ok((username.to_string(), password.to_string()))
}

impl FromRequestParts<AppState> for Authenticated {
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
		let value = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or_else(|| ApiError::Unauthorized("Missing credentials".into()))?
			.to_str()
			.map_err(|_| ApiError::Unauthorized("Malformed credentials".into()))?;
		let (username, password) = parse_basic(value)?;

		match state.engine.directory().authenticate(&username, &password).await {
			Ok(customer) => Ok(Authenticated(RequestContext::new(customer))),
			Err(OrderError::AuthorizationDenied(message)) => Err(ApiError::Unauthorized(message)),
			Err(e) => Err(e.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_basic() {
		let header = format!("Basic {}", BASE64_STANDARD.encode("papa:pass:word"));
		let (username, password) = parse_basic(&header).unwrap();
		assert_eq!(username, "papa");
		// only the first colon separates the username
		assert_eq!(password, "pass:word");

		assert!(parse_basic("Bearer abc").is_err());
		assert!(parse_basic("Basic !!!").is_err());
		assert!(parse_basic(&format!("Basic {}", BASE64_STANDARD.encode("nocolon"))).is_err());
	}
}
