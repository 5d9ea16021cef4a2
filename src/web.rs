//! Persistent HTTP listener.

use std::any::Any;
use std::net::IpAddr;
use std::str::FromStr;

use poem::http::StatusCode;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Tracing};
use poem::{get, handler, post, Endpoint, EndpointExt, IntoResponse, Response, Route, Server};
use tokio::task::spawn_blocking;

use crate::api::{self, Reply, CONTENT_TYPE};
use crate::opts::WebOpts;
use crate::prelude::*;
use crate::regression::Degree;
use crate::web::middleware::{ErrorMiddleware, SentryMiddleware, TimeItMiddleware};

mod middleware;

const SHUTDOWN_TIMEOUT: StdDuration = StdDuration::from_secs(10);

pub async fn run(opts: &WebOpts) -> Result {
    let host = IpAddr::from_str(&opts.host)
        .with_context(|| format!("`{}` is not a valid bind host", opts.host))?;
    info!(%host, port = opts.port, "listening…");
    Server::new(TcpListener::bind((host, opts.port)))
        .run_with_graceful_shutdown(create_app(), shutdown_signal(), Some(SHUTDOWN_TIMEOUT))
        .await
        .context("the web server has failed")?;
    info!("stopped");
    Ok(())
}

pub fn create_app() -> impl Endpoint {
    Route::new()
        .at("/linear", post(post_linear))
        .at("/quadratic", post(post_quadratic))
        .at("/health", get(get_health))
        .with(Tracing)
        .with(CatchPanic::new().with_handler(on_panic))
        .with(ErrorMiddleware)
        .with(TimeItMiddleware)
        .with(SentryMiddleware)
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        Response::builder()
            .status(self.status)
            .content_type(CONTENT_TYPE)
            .body(self.body)
    }
}

#[handler]
#[instrument(level = "info", skip_all)]
async fn post_linear(body: Vec<u8>) -> Reply {
    respond(Degree::Linear, body).await
}

#[handler]
#[instrument(level = "info", skip_all)]
async fn post_quadratic(body: Vec<u8>) -> Reply {
    respond(Degree::Quadratic, body).await
}

#[handler]
async fn get_health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Runs the regression off the async workers, since it's CPU-bound.
async fn respond(degree: Degree, body: Vec<u8>) -> Reply {
    match spawn_blocking(move || api::respond(degree, &body)).await {
        Ok(reply) => reply,
        Err(error) => {
            error!(%degree, "the regression task has failed: {:#}", error);
            Reply::internal_error()
        }
    }
}

fn on_panic(_: Box<dyn Any + Send + 'static>) -> Reply {
    error!("a handler has panicked");
    Reply::internal_error()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => info!("shutting down…"),
        Err(error) => {
            error!("failed to listen for the shutdown signal: {:#}", error);
            std::future::pending::<()>().await;
        }
    }
}
