//! Builders for raw telemetry lines.

use serde_json::{Value, json};

pub fn agent(name: &str, agent_id: &str, timestamp: &str, agent_type: &str) -> String {
    format!("AGENT|{name}|{agent_id}|{timestamp}|{agent_type}")
}

pub fn activity(name: &str, agent_id: &str, timestamp: &str, activity_type: &str) -> String {
    format!("ACTIVITY|{name}|{agent_id}|{timestamp}|{activity_type}")
}

pub fn entity(
    name: &str,
    agent_id: &str,
    timestamp: &str,
    entity_type: &str,
    operation: &str,
    payload: &Value,
) -> String {
    format!("ENTITY|{name}|{agent_id}|{timestamp}|{entity_type}|{operation}|{payload}")
}

pub fn register_write(name: &str, agent_id: &str, timestamp: &str, index: &str, value: &str) -> String {
    entity(name, agent_id, timestamp, "register", "WRITE", &json!({ "index": index, "value": value }))
}

pub fn register_read(name: &str, agent_id: &str, timestamp: &str, index: &str, value: &str) -> String {
    entity(name, agent_id, timestamp, "register", "READ", &json!({ "index": index, "value": value }))
}

/// Switch agent and packet processor activity sharing `agent_id`.
pub fn switch_session(agent_id: &str) -> Vec<String> {
    vec![
        agent("S1", agent_id, "t0", "Switch"),
        activity("A1", agent_id, "t1", "PacketProcessor"),
    ]
}
