use crate::server::connections::ConnectionRegistry;
use crate::tools::SEARCH_TOOL_NAME;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub name: String,
    pub version: String,
    pub tool: String,
    pub active_connections: usize,
}

impl HealthStatus {
    pub fn current(connections: &ConnectionRegistry) -> Self {
        Self {
            status: "ok".to_string(),
            name: crate::server::handler::SERVER_NAME.to_string(),
            version: crate::VERSION.to_string(),
            tool: SEARCH_TOOL_NAME.to_string(),
            active_connections: connections.len(),
        }
    }
}

/// Liveness handler; if we can respond, we're alive
pub async fn health_handler(State(connections): State<ConnectionRegistry>) -> Json<HealthStatus> {
    Json(HealthStatus::current(&connections))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_counts_connections() {
        let registry = ConnectionRegistry::new();
        let (_guard, _rx) = registry.open();

        let status = HealthStatus::current(&registry);
        assert_eq!(status.status, "ok");
        assert_eq!(status.tool, "search_radio_stations");
        assert_eq!(status.active_connections, 1);
    }

    #[test]
    fn test_health_status_serializes_camel_case() {
        let status = HealthStatus::current(&ConnectionRegistry::new());
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["activeConnections"], 0);
    }
}
