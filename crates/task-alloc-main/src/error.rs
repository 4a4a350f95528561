// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use task_alloc_model::err::{ComputationError, ValidationError};
use task_alloc_solver::builder::BuildModelError;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<BuildModelError> for ServiceError {
    fn from(value: BuildModelError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Computation(_) => "COMPUTATION_ERROR",
            ServiceError::InvalidBody(_) => "INVALID_REQUEST_BODY",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ServiceError::Computation(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(code = self.code(), %message, "Request failed");
        } else {
            warn!(code = self.code(), %message, "Request rejected");
        }
        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let v = ServiceError::from(ValidationError::NoTasks);
        assert_eq!(v.code(), "VALIDATION_ERROR");
        assert_eq!(v.status(), StatusCode::BAD_REQUEST);
        assert_eq!(v.to_string(), ValidationError::NoTasks.to_string());

        let c = ServiceError::from(ComputationError::PoolUnavailable("x".into()));
        assert_eq!(c.code(), "COMPUTATION_ERROR");
        assert_eq!(c.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let b = ServiceError::InvalidBody("eof".into());
        assert_eq!(b.code(), "INVALID_REQUEST_BODY");
        assert_eq!(b.status(), StatusCode::BAD_REQUEST);

        let i = ServiceError::from(BuildModelError::NegativePenalty(-1));
        assert_eq!(i.code(), "INTERNAL_ERROR");
        assert!(i.to_string().contains("negative"));
    }
}
