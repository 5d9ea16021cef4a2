//! Request decoding and response encoding shared by the HTTP listener and the event handler,
//! so both transports produce the same bytes for the same input.

use poem::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;
use crate::regression::{self, Degree, FailureKind, Outcome, RegressionError};

pub const CONTENT_TYPE: &str = "application/json";

/// Generic body for failures that escaped the classification.
pub const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal Server Error"}"#;

/// Request body with both fields present and non-null.
#[derive(Debug)]
pub struct RegressionRequest {
    pub x: Value,
    pub y: Value,
}

impl RegressionRequest {
    /// Parses a raw body, an empty body is treated as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, RegressionError> {
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"{}" } else { body };
        let value = serde_json::from_slice::<Value>(body).map_err(|error| {
            RegressionError::InvalidInput(format!("Invalid JSON in request body: {}", error).into())
        })?;
        let mut object = match value {
            Value::Object(object) => object,
            _ => return Err(RegressionError::invalid("Request body must be JSON")),
        };
        match (object.remove("x"), object.remove("y")) {
            (Some(x), Some(y)) if !x.is_null() && !y.is_null() => Ok(Self { x, y }),
            _ => Err(RegressionError::invalid(r#"Request body must contain "x" and "y" arrays."#)),
        }
    }

    pub fn fit(&self, degree: Degree) -> Outcome {
        match degree {
            Degree::Linear => regression::linear(Some(&self.x), Some(&self.y)),
            Degree::Quadratic => regression::quadratic(Some(&self.x), Some(&self.y)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Transport-independent response: a status code and a JSON body.
#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(error) => {
                error!("failed to serialize the response: {:#}", error);
                Self::internal_error()
            }
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, &ErrorBody { error: message.into() })
    }

    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: INTERNAL_ERROR_BODY.to_string(),
        }
    }

    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Ok(result) => Self::json(StatusCode::OK, result),
            Err(error) => Self::error(status_code(error.kind()), error.to_string()),
        }
    }
}

pub const fn status_code(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
        FailureKind::ComputationError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Full request cycle for a known route.
pub fn respond(degree: Degree, body: &[u8]) -> Reply {
    let outcome = RegressionRequest::from_body(body).and_then(|request| request.fit(degree));
    Reply::from_outcome(&outcome)
}
