//! Decoding of the JSON payload carried in the last field of ENTITY messages.
//!
//! Each entity kind maps to a fixed attribute set. Unknown keys are ignored.
//! Scalars may arrive as JSON strings, numbers or booleans and are kept as
//! strings. Numbers keep their wire text (`5.0` stays `5.0`, integers wider
//! than 64 bits are not rounded) so value comparisons see what the device
//! sent. Optional attributes fall back to the sentinels in
//! `vocabulary::defaults`.

use crate::error::{MessageError, Result};
use crate::message::EntityKind;
use p4prov_provenance::vocabulary::{defaults, p4};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_json::value::RawValue;

/// Text of a scalar JSON value, `None` for `null`.
fn scalar_text(raw: &RawValue) -> std::result::Result<Option<String>, serde_json::Error> {
    let text = raw.get().trim();
    match text.as_bytes().first() {
        Some(b'"') => serde_json::from_str::<String>(text).map(Some),
        Some(b'{') | Some(b'[') => Err(serde_json::Error::custom(format!(
            "expected a string, number or boolean, got '{}'",
            text
        ))),
        _ if text == "null" => Ok(None),
        _ => Ok(Some(text.to_string())),
    }
}

fn scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    scalar_text(&raw)
        .map_err(D::Error::custom)?
        .ok_or_else(|| D::Error::custom("expected a string, number or boolean, got null"))
}

fn optional_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Box<RawValue>>::deserialize(deserializer)? {
        Some(raw) => scalar_text(&raw).map_err(D::Error::custom),
        None => Ok(None),
    }
}

/// A register cell write or read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterCell {
    #[serde(deserialize_with = "scalar")]
    pub index: String,
    #[serde(deserialize_with = "scalar")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PacketIn {
    #[serde(default, deserialize_with = "optional_scalar")]
    src_mac: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    ingress_port: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    ether_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    lldp_id: Option<String>,
}

impl PacketIn {
    pub fn src_mac(&self) -> &str {
        self.src_mac.as_deref().unwrap_or(defaults::MISSING_MAC)
    }

    pub fn ingress_port(&self) -> &str {
        self.ingress_port.as_deref().unwrap_or(defaults::MISSING_PORT)
    }

    pub fn ether_type(&self) -> &str {
        self.ether_type.as_deref().unwrap_or(defaults::MISSING_ETHER_TYPE)
    }

    pub fn lldp_id(&self) -> &str {
        self.lldp_id.as_deref().unwrap_or(defaults::MISSING_LLDP_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PacketOut {
    #[serde(default, deserialize_with = "optional_scalar")]
    dst_mac: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    egress_port: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    ether_type: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    lldp_id: Option<String>,
}

impl PacketOut {
    pub fn dst_mac(&self) -> &str {
        self.dst_mac.as_deref().unwrap_or(defaults::MISSING_MAC)
    }

    pub fn egress_port(&self) -> &str {
        self.egress_port.as_deref().unwrap_or(defaults::MISSING_PORT)
    }

    pub fn ether_type(&self) -> &str {
        self.ether_type.as_deref().unwrap_or(defaults::MISSING_ETHER_TYPE)
    }

    pub fn lldp_id(&self) -> &str {
        self.lldp_id.as_deref().unwrap_or(defaults::MISSING_LLDP_ID)
    }
}

/// A match-action table rule (`table_rule` and `MATRule` messages).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableRule {
    #[serde(deserialize_with = "scalar")]
    pub table_name: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    match_key: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    action: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    priority: Option<String>,
}

impl TableRule {
    pub fn match_key(&self) -> &str {
        self.match_key.as_deref().unwrap_or(defaults::MISSING_MATCH_KEY)
    }

    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or(defaults::MISSING_ACTION)
    }

    pub fn priority(&self) -> &str {
        self.priority.as_deref().unwrap_or(defaults::MISSING_PRIORITY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityPayload {
    Register(RegisterCell),
    PacketIn(PacketIn),
    PacketOut(PacketOut),
    TableRule(TableRule),
}

impl EntityPayload {
    /// Decode `raw` according to `kind`. `entity_type` is the raw wire tag,
    /// used only for error reporting.
    pub fn decode(kind: EntityKind, entity_type: &str, raw: &str) -> Result<Self> {
        let invalid = |reason: String| MessageError::InvalidPayload {
            entity_type: entity_type.to_string(),
            reason,
        };
        let value: Value = serde_json::from_str(raw).map_err(|err| invalid(err.to_string()))?;
        if !value.is_object() {
            return Err(invalid(format!("expected a JSON object, got '{}'", raw.trim())));
        }
        // Typed decoding reads the raw text again so scalars keep their wire form.
        let payload = match kind {
            EntityKind::Register => fields(raw).map(EntityPayload::Register),
            EntityKind::PacketIn => fields(raw).map(EntityPayload::PacketIn),
            EntityKind::PacketOut => fields(raw).map(EntityPayload::PacketOut),
            EntityKind::TableRule | EntityKind::MatRule => fields(raw).map(EntityPayload::TableRule),
        };
        payload.map_err(|err| invalid(err.to_string()))
    }

    /// Annotation pairs contributed to the Entity vertex.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            EntityPayload::Register(cell) => vec![
                (p4::INDEX, cell.index.clone()),
                (p4::VALUE, cell.value.clone()),
            ],
            EntityPayload::PacketIn(packet) => vec![
                (p4::SRC_MAC, packet.src_mac().to_string()),
                (p4::INGRESS_PORT, packet.ingress_port().to_string()),
                (p4::ETHER_TYPE, packet.ether_type().to_string()),
                (p4::LLDP_ID, packet.lldp_id().to_string()),
            ],
            EntityPayload::PacketOut(packet) => vec![
                (p4::DST_MAC, packet.dst_mac().to_string()),
                (p4::EGRESS_PORT, packet.egress_port().to_string()),
                (p4::ETHER_TYPE, packet.ether_type().to_string()),
                (p4::LLDP_ID, packet.lldp_id().to_string()),
            ],
            EntityPayload::TableRule(rule) => vec![
                (p4::TABLE_NAME, rule.table_name.clone()),
                (p4::MATCH_KEY, rule.match_key().to_string()),
                (p4::ACTION, rule.action().to_string()),
                (p4::PRIORITY, rule.priority().to_string()),
            ],
        }
    }
}

fn fields<T: DeserializeOwned>(raw: &str) -> serde_json::Result<T> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(payload: &EntityPayload) -> std::collections::BTreeMap<&'static str, String> {
        payload.attributes().into_iter().collect()
    }

    #[test]
    fn packet_in_defaults_missing_attributes() {
        let payload =
            EntityPayload::decode(EntityKind::PacketIn, "packet_in", r#"{"ether_type": 35020}"#)
                .unwrap();
        let attrs = attrs(&payload);
        assert_eq!(attrs["ingress_port"], "-1");
        assert_eq!(attrs["src_mac"], "0");
        assert_eq!(attrs["lldp_id"], "0");
        assert_eq!(attrs["ether_type"], "35020");
    }

    #[test]
    fn null_optional_attribute_counts_as_missing() {
        let payload = EntityPayload::decode(
            EntityKind::PacketOut,
            "packet_out",
            r#"{"egress_port": null, "dst_mac": "aa:bb:cc:dd:ee:ff"}"#,
        )
        .unwrap();
        let attrs = attrs(&payload);
        assert_eq!(attrs["egress_port"], "-1");
        assert_eq!(attrs["dst_mac"], "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn register_accepts_numeric_scalars_and_ignores_unknown_keys() {
        let payload = EntityPayload::decode(
            EntityKind::Register,
            "register",
            r#"{"index": 3, "value": 42, "width": 32}"#,
        )
        .unwrap();
        assert_eq!(
            payload,
            EntityPayload::Register(RegisterCell { index: "3".to_string(), value: "42".to_string() })
        );
    }

    #[test]
    fn numbers_keep_their_wire_text() {
        let decode = |raw: &str| match EntityPayload::decode(EntityKind::Register, "register", raw) {
            Ok(EntityPayload::Register(cell)) => cell.value,
            other => panic!("unexpected payload: {other:?}"),
        };
        assert_eq!(decode(r#"{"index": 0, "value": 18446744073709551616}"#), "18446744073709551616");
        assert_eq!(decode(r#"{"index": 0, "value": 18446744073709551617}"#), "18446744073709551617");
        assert_eq!(decode(r#"{"index": 0, "value": 5.0}"#), "5.0");
        assert_eq!(decode(r#"{"index": 0, "value": -1.5e3}"#), "-1.5e3");
        assert_eq!(decode(r#"{"index": 0, "value": true}"#), "true");
        assert_eq!(decode(r#"{"index": 0, "value": "a\"b"}"#), "a\"b");
    }

    #[test]
    fn nested_or_null_register_value_is_invalid() {
        for raw in [r#"{"index": "0", "value": {"x": 1}}"#, r#"{"index": "0", "value": null}"#] {
            let err = EntityPayload::decode(EntityKind::Register, "register", raw).unwrap_err();
            assert_eq!(err.kind(), "invalid_payload", "payload: {raw}");
        }
    }

    #[test]
    fn register_without_value_is_invalid() {
        let err = EntityPayload::decode(EntityKind::Register, "register", r#"{"index": "0"}"#)
            .unwrap_err();
        match err {
            MessageError::InvalidPayload { entity_type, reason } => {
                assert_eq!(entity_type, "register");
                assert!(reason.contains("value"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_payload_is_invalid() {
        let err = EntityPayload::decode(EntityKind::Register, "register", r#"["0", "5"]"#)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_payload");

        let err = EntityPayload::decode(EntityKind::PacketIn, "packet_in", "{not json").unwrap_err();
        assert_eq!(err.kind(), "invalid_payload");
    }

    #[test]
    fn mat_rule_uses_table_rule_attributes() {
        let payload = EntityPayload::decode(
            EntityKind::MatRule,
            "MATRule",
            r#"{"table_name": "ipv4_lpm", "match_key": "10.0.0.0/24"}"#,
        )
        .unwrap();
        let attrs = attrs(&payload);
        assert_eq!(attrs["table_name"], "ipv4_lpm");
        assert_eq!(attrs["action"], "NoAction");
        assert_eq!(attrs["priority"], "-1");
    }
}
