//! GET /health: the one HTTP contract the transport layer specifies
//! besides the tool surface itself.

use std::time::Instant;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::context::Context;
use crate::graph::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum StoreConnection {
    Connected,
    Disconnected,
}

#[derive(Serialize)]
struct HealthBody {
    status: Status,
    falkordb: StoreConnection,
    graphs: Option<storage::GraphStatistics>,
    uptime: u64,
}

/// Probes the backing store and reports overall server health.
///
/// `ok` when the store round-trips and statistics are readable; `degraded`
/// when the store answers but statistics fail to load; `error` when the
/// store is unreachable. Status maps to HTTP 200/503/500 respectively.
pub async fn health(ctx: std::sync::Arc<Context>, started_at: Instant) -> impl IntoResponse {
    let connected = storage::health_check(ctx.graph.as_ref()).await;
    let uptime = started_at.elapsed().as_secs();

    if !connected {
        let body = HealthBody {
            status: Status::Error,
            falkordb: StoreConnection::Disconnected,
            graphs: None,
            uptime,
        };
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body));
    }

    match storage::get_statistics(ctx.graph.as_ref()).await {
        Ok(stats) => {
            let body = HealthBody {
                status: Status::Ok,
                falkordb: StoreConnection::Connected,
                graphs: Some(stats),
                uptime,
            };
            (StatusCode::OK, Json(body))
        }
        Err(_) => {
            let body = HealthBody {
                status: Status::Degraded,
                falkordb: StoreConnection::Connected,
                graphs: None,
                uptime,
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}
