//! The catch-all news handler.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::news::NewsFeed;
use crate::observability::Transaction;

/// Name given to every request's transaction, whatever the path or method.
pub const TRANSACTION_NAME: &str = "GET /news";

/// Value of the `service` transaction attribute.
pub const SERVICE_NAME: &str = "ts-news-service";

/// Value of the `endpoint` transaction attribute.
pub const ENDPOINT_NAME: &str = "/news";

/// Serve the news payload, recording a transaction when monitoring is up.
pub async fn news_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut txn = state
        .monitor
        .as_deref()
        .map(|app| app.start_transaction(TRANSACTION_NAME));

    if let Some(txn) = txn.as_mut() {
        annotate(txn);
        txn.set_web_request(&request);
    }

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        monitored = txn.is_some(),
        "Serving news"
    );

    let response = news_response(&state.feed);

    if let Some(txn) = txn.as_mut() {
        txn.set_web_response(&response);
    }

    response
}

fn annotate(txn: &mut Transaction<'_>) {
    for (key, value) in [("service", SERVICE_NAME), ("endpoint", ENDPOINT_NAME)] {
        if let Err(e) = txn.add_attribute(key, value) {
            tracing::debug!(error = %e, key, "Failed to add transaction attribute");
        }
    }
}

/// 200 with `Content-Type: application/json` and the feed as body.
pub fn news_response(feed: &NewsFeed) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        feed.payload(),
    )
        .into_response()
}
