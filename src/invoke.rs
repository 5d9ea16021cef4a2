//! Single-shot event handler: one routed event in, one response object out.

use std::panic::catch_unwind;

use poem::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::io::{stdin, AsyncReadExt};

use crate::api::{Reply, RegressionRequest, CONTENT_TYPE};
use crate::opts::InvokeOpts;
use crate::prelude::*;
use crate::regression::Degree;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub route_key: Option<String>,

    /// Absent and empty bodies are both treated as `{}`.
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: Headers,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Headers {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

impl From<Reply> for EventResponse {
    fn from(reply: Reply) -> Self {
        Self {
            status_code: reply.status.as_u16(),
            body: reply.body,
            headers: Headers {
                content_type: CONTENT_TYPE.to_string(),
            },
        }
    }
}

/// Reads the event, handles it and prints the response object to the standard output.
pub async fn run(opts: &InvokeOpts) -> Result {
    let event = match &opts.event {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read the event from `{}`", path.display()))?,
        None => {
            let mut event = String::new();
            stdin()
                .read_to_string(&mut event)
                .await
                .context("failed to read the event from the standard input")?;
            event
        }
    };
    let response = handle_raw(&event);
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

/// Parses the event envelope first, a malformed envelope is a client error.
pub fn handle_raw(event: &str) -> EventResponse {
    match serde_json::from_str::<Event>(event) {
        Ok(event) => handle(&event),
        Err(error) => {
            warn!("invalid event: {:#}", error);
            Reply::error(StatusCode::BAD_REQUEST, format!("Invalid event: {}", error)).into()
        }
    }
}

/// Handles the event, any panic is reported as the generic internal error.
#[instrument(level = "info", skip_all, fields(route_key = ?event.route_key))]
pub fn handle(event: &Event) -> EventResponse {
    catch_unwind(|| dispatch(event))
        .unwrap_or_else(|_| {
            error!("the event handler has panicked");
            Reply::internal_error()
        })
        .into()
}

fn dispatch(event: &Event) -> Reply {
    let body = event.body.as_deref().unwrap_or_default();
    let request = match RegressionRequest::from_body(body.as_bytes()) {
        Ok(request) => request,
        Err(error) => {
            warn!("{}", error);
            return Reply::from_outcome(&Err(error));
        }
    };
    let route_key = match event.route_key.as_deref() {
        Some(route_key) => route_key,
        None => {
            warn!("the event has no route key");
            return Reply::error(StatusCode::BAD_REQUEST, r#"Event must contain "routeKey""#);
        }
    };
    match route(route_key) {
        Some(degree) => Reply::from_outcome(&request.fit(degree)),
        None => {
            warn!(route_key, "route not found");
            Reply::error(StatusCode::NOT_FOUND, "Not Found")
        }
    }
}

fn route(route_key: &str) -> Option<Degree> {
    match route_key {
        "POST /linear" => Some(Degree::Linear),
        "POST /quadratic" => Some(Degree::Quadratic),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::{respond, ErrorBody};
    use crate::regression::FitResult;

    fn event(route_key: &str, body: &str) -> Event {
        Event {
            route_key: Some(route_key.to_string()),
            body: Some(body.to_string()),
        }
    }

    fn error_message(response: &EventResponse) -> crate::Result<String> {
        Ok(serde_json::from_str::<ErrorBody>(&response.body)?.error)
    }

    #[test]
    fn linear_ok() -> crate::Result {
        let response = handle(&event(
            "POST /linear",
            // language=JSON
            r#"{"x": [1, 2, 3], "y": [2, 4, 6]}"#,
        ));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers.content_type, "application/json");
        let result: FitResult = serde_json::from_str(&response.body)?;
        assert!(result.params[0].abs() < 1e-9);
        assert!((result.params[1] - 2.0).abs() < 1e-9);
        assert!(result.rmse.abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn quadratic_default_fit_ok() {
        let response = handle(&event(
            "POST /quadratic",
            // language=JSON
            r#"{"x": [1, 2], "y": [3, 5]}"#,
        ));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"params":[0.0,0.0,0.0],"RMSE":0.0}"#);
    }

    #[test]
    fn same_bytes_as_http_ok() {
        // language=JSON
        let body = r#"{"x": [0.5, 1.5, 2.5, 4], "y": [1.2, 2.9, 6.1, 15.8]}"#;
        let response = handle(&event("POST /quadratic", body));
        let reply = respond(Degree::Quadratic, body.as_bytes());
        assert_eq!(response.status_code, reply.status.as_u16());
        assert_eq!(response.body, reply.body);
    }

    #[test]
    fn unknown_route_not_found() -> crate::Result {
        let response = handle(&event("GET /linear", r#"{"x": [1], "y": [1]}"#));
        assert_eq!(response.status_code, 404);
        assert_eq!(error_message(&response)?, "Not Found");
        Ok(())
    }

    #[test]
    fn body_is_parsed_before_routing() -> crate::Result {
        let response = handle(&event("POST /cubic", "{not json"));
        assert_eq!(response.status_code, 400);
        assert!(error_message(&response)?.starts_with("Invalid JSON in request body: "));
        Ok(())
    }

    #[test]
    fn empty_body_fails() -> crate::Result {
        for body in [None, Some(String::new())] {
            let response = handle(&Event {
                route_key: Some("POST /linear".to_string()),
                body,
            });
            assert_eq!(response.status_code, 400);
            assert_eq!(
                error_message(&response)?,
                r#"Request body must contain "x" and "y" arrays."#,
            );
        }
        Ok(())
    }

    #[test]
    fn length_mismatch_fails() -> crate::Result {
        let response = handle(&event("POST /linear", r#"{"x": [1, 2], "y": [1]}"#));
        assert_eq!(response.status_code, 400);
        assert_eq!(error_message(&response)?, "Input lists 'x' and 'y' must have the same length.");
        Ok(())
    }

    #[test]
    fn singular_system_fails() -> crate::Result {
        let response = handle(&event("POST /quadratic", r#"{"x": [1, 1, 2], "y": [1, 2, 3]}"#));
        assert_eq!(response.status_code, 500);
        assert!(error_message(&response)?.starts_with("Error during quadratic regression: "));
        Ok(())
    }

    #[test]
    fn missing_route_key_fails() {
        let response = handle(&Event {
            route_key: None,
            body: Some(r#"{"x": [1], "y": [1]}"#.to_string()),
        });
        assert_eq!(response.status_code, 400);
    }

    #[test]
    fn handle_raw_ok() -> crate::Result {
        let response = handle_raw(
            // language=JSON
            r#"{
                "version": "2.0",
                "routeKey": "POST /linear",
                "rawPath": "/linear",
                "body": "{\"x\": [1, 2], \"y\": [1, 2]}",
                "isBase64Encoded": false
            }"#,
        );
        assert_eq!(response.status_code, 200);
        let result: FitResult = serde_json::from_str(&response.body)?;
        assert!(result.params[0].abs() < 1e-9);
        assert!((result.params[1] - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn handle_raw_invalid_event_fails() -> crate::Result {
        let response = handle_raw("{\"routeKey\": ");
        assert_eq!(response.status_code, 400);
        assert!(error_message(&response)?.starts_with("Invalid event: "));
        Ok(())
    }

    #[test]
    fn response_wire_format_ok() -> crate::Result {
        let response = EventResponse::from(Reply::error(StatusCode::NOT_FOUND, "Not Found"));
        assert_eq!(
            serde_json::to_value(&response)?,
            json!({
                "statusCode": 404,
                "body": r#"{"error":"Not Found"}"#,
                "headers": {"Content-Type": "application/json"},
            }),
        );
        Ok(())
    }
}
