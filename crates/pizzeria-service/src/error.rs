//! Error type returned by every API handler.

use axum::{
	http::{header, StatusCode},
	response::{IntoResponse, Json, Response},
};
use pizzeria_core::OrderError;
use pizzeria_types::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
	/// Missing or wrong credentials.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),
	#[error(transparent)]
	Order(#[from] OrderError),
}

impl ApiError {
	fn status_and_code(&self) -> (StatusCode, &'static str) {
		match self {
			ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
			ApiError::Order(OrderError::AuthorizationDenied(_)) => {
				(StatusCode::FORBIDDEN, "AUTHORIZATION_DENIED")
			},
			ApiError::Order(OrderError::InvariantViolation(_)) => {
				(StatusCode::CONFLICT, "INVARIANT_VIOLATION")
			},
			ApiError::Order(OrderError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
			ApiError::Order(OrderError::Storage(_)) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, code) = self.status_and_code();
		if status.is_server_error() {
			tracing::error!(error = %self, "Request failed");
		} else {
			tracing::debug!(error = %self, "Request rejected");
		}

		let body = Json(ErrorResponse {
			error: code.to_string(),
			message: self.to_string(),
		});
		match self {
			ApiError::Unauthorized(_) => (
				status,
				[(header::WWW_AUTHENTICATE, "Basic realm=\"pizzeria\"")],
				body,
			)
				.into_response(),
			_ => (status, body).into_response(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_errors_map_to_status() {
		let cases = [
			(OrderError::AuthorizationDenied("x".into()), StatusCode::FORBIDDEN),
			(OrderError::InvariantViolation("x".into()), StatusCode::CONFLICT),
			(OrderError::NotFound("x".into()), StatusCode::NOT_FOUND),
			(OrderError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
		];
		for (error, status) in cases {
			assert_eq!(ApiError::from(error).into_response().status(), status);
		}
	}

	#[test]
	fn test_unauthorized_challenges_for_basic_auth() {
		let response = ApiError::Unauthorized("missing credentials".into()).into_response();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
	}
}
