//! Provenance vocabulary constants.
//!
//! This module defines all vocabulary terms used when annotating the P4
//! provenance graph: W3C PROV relation labels, the annotation keys written
//! on vertices and edges, and the device type tags seen on the wire.

// PROV standard attributes
pub mod prov {
    pub const ROLE: &str = "prov:role";
    pub const TIME: &str = "prov:time";
}

// Base vertex labels
pub mod base_types {
    pub const ENTITY: &str = "Entity";
    pub const ACTIVITY: &str = "Activity";
    pub const AGENT: &str = "Agent";
}

// PROV relations
pub mod prov_relations {
    pub const USED: &str = "Used";
    pub const WAS_GENERATED_BY: &str = "WasGeneratedBy";
    pub const WAS_ASSOCIATED_WITH: &str = "WasAssociatedWith";
    pub const WAS_DERIVED_FROM: &str = "WasDerivedFrom";
}

// Annotation keys shared by every vertex kind
pub mod p4 {
    pub const NAME: &str = "name";
    pub const AGENT_ID: &str = "agent_id";
    pub const TIMESTAMP: &str = "timestamp";

    pub const AGENT_TYPE: &str = "agent_type";
    pub const ACTIVITY_TYPE: &str = "activity_type";
    pub const ENTITY_TYPE: &str = "entity_type";
    pub const OPERATION: &str = "operation";

    // Register cells
    pub const INDEX: &str = "index";
    pub const VALUE: &str = "value";
    pub const PREVIOUS_VALUE: &str = "previous_value";

    // Packet-in / packet-out events
    pub const SRC_MAC: &str = "src_mac";
    pub const DST_MAC: &str = "dst_mac";
    pub const INGRESS_PORT: &str = "ingress_port";
    pub const EGRESS_PORT: &str = "egress_port";
    pub const ETHER_TYPE: &str = "ether_type";
    pub const LLDP_ID: &str = "lldp_id";

    // Match-action table rules
    pub const TABLE_NAME: &str = "table_name";
    pub const MATCH_KEY: &str = "match_key";
    pub const ACTION: &str = "action";
    pub const PRIORITY: &str = "priority";
}

// Wire tags at field index 0
pub mod event_types {
    pub const ACTIVITY: &str = "ACTIVITY";
    pub const AGENT: &str = "AGENT";
    pub const ENTITY: &str = "ENTITY";
}

// Wire tags at field index 5
pub mod operations {
    pub const READ: &str = "READ";
    pub const WRITE: &str = "WRITE";
    pub const ADD: &str = "ADD";
}

// Wire tags at field index 4 of ENTITY messages
pub mod entity_types {
    pub const REGISTER: &str = "register";
    pub const MAT_RULE: &str = "MATRule";
    pub const PACKET_IN: &str = "packet_in";
    pub const PACKET_OUT: &str = "packet_out";
    pub const TABLE_RULE: &str = "table_rule";
}

pub mod activity_types {
    pub const EVENT_PROCESSOR: &str = "EventProcessor";
    pub const PACKET_PROCESSOR: &str = "PacketProcessor";
}

pub mod agent_types {
    pub const CONTROLLER: &str = "Controller";
    pub const SWITCH: &str = "Switch";
}

// PROV roles
pub mod prov_roles {
    pub const EXECUTING_AGENT: &str = "executing_agent";
}

// Sentinels for absent payload attributes
pub mod defaults {
    pub const MISSING_PORT: &str = "-1";
    pub const MISSING_ETHER_TYPE: &str = "-1";
    pub const MISSING_MAC: &str = "0";
    pub const MISSING_LLDP_ID: &str = "0";
    pub const MISSING_MATCH_KEY: &str = "";
    pub const MISSING_ACTION: &str = "NoAction";
    pub const MISSING_PRIORITY: &str = "-1";
}
