use crate::vocabulary::{base_types, prov_relations};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! define_prov_id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_prov_id_type!(
    /// Provenance entity identifier.
    ProvEntityId
);

define_prov_id_type!(
    /// Provenance activity identifier.
    ProvActivityId
);

define_prov_id_type!(
    /// Provenance agent identifier.
    ProvAgentId
);

define_prov_id_type!(
    /// Provenance relation identifier.
    EdgeId
);

/// Annotation key to string value. Keys are unique; order carries no meaning.
pub type Annotations = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: ProvEntityId,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ProvActivityId,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: ProvAgentId,
    pub annotations: Annotations,
}

macro_rules! impl_annotation_lookup {
    ($($name:ident),*) => {
        $(
            impl $name {
                pub fn annotation(&self, key: &str) -> Option<&str> {
                    self.annotations.get(key).map(String::as_str)
                }
            }
        )*
    };
}

impl_annotation_lookup!(Entity, Activity, Agent);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Vertex {
    Activity(Activity),
    Agent(Agent),
    Entity(Entity),
}

impl Vertex {
    pub fn id(&self) -> &str {
        match self {
            Vertex::Activity(activity) => activity.id.as_str(),
            Vertex::Agent(agent) => agent.id.as_str(),
            Vertex::Entity(entity) => entity.id.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Vertex::Activity(_) => base_types::ACTIVITY,
            Vertex::Agent(_) => base_types::AGENT,
            Vertex::Entity(_) => base_types::ENTITY,
        }
    }

    pub fn annotations(&self) -> &Annotations {
        match self {
            Vertex::Activity(activity) => &activity.annotations,
            Vertex::Agent(agent) => &agent.annotations,
            Vertex::Entity(entity) => &entity.annotations,
        }
    }
}

impl From<Activity> for Vertex {
    fn from(value: Activity) -> Self {
        Vertex::Activity(value)
    }
}

impl From<Agent> for Vertex {
    fn from(value: Agent) -> Self {
        Vertex::Agent(value)
    }
}

impl From<Entity> for Vertex {
    fn from(value: Entity) -> Self {
        Vertex::Entity(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvNodeRef {
    Entity(ProvEntityId),
    Activity(ProvActivityId),
    Agent(ProvAgentId),
}

impl ProvNodeRef {
    pub fn label(&self) -> &'static str {
        match self {
            ProvNodeRef::Entity(_) => base_types::ENTITY,
            ProvNodeRef::Activity(_) => base_types::ACTIVITY,
            ProvNodeRef::Agent(_) => base_types::AGENT,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ProvNodeRef::Entity(id) => id.as_str(),
            ProvNodeRef::Activity(id) => id.as_str(),
            ProvNodeRef::Agent(id) => id.as_str(),
        }
    }
}

/// Activity read entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Used {
    pub id: EdgeId,
    pub activity: ProvActivityId,
    pub entity: ProvEntityId,
    pub annotations: Annotations,
}

/// Activity produced or updated entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasGeneratedBy {
    pub id: EdgeId,
    pub entity: ProvEntityId,
    pub activity: ProvActivityId,
    pub annotations: Annotations,
}

/// Activity executed under agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasAssociatedWith {
    pub id: EdgeId,
    pub activity: ProvActivityId,
    pub agent: ProvAgentId,
    pub annotations: Annotations,
}

/// New entity-state value derived from the prior value of the same state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasDerivedFrom {
    pub id: EdgeId,
    pub generated_entity: ProvEntityId,
    pub used_entity: ProvEntityId,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Edge {
    Used(Used),
    WasGeneratedBy(WasGeneratedBy),
    WasAssociatedWith(WasAssociatedWith),
    WasDerivedFrom(WasDerivedFrom),
}

impl Edge {
    pub fn id(&self) -> &EdgeId {
        match self {
            Edge::Used(rel) => &rel.id,
            Edge::WasGeneratedBy(rel) => &rel.id,
            Edge::WasAssociatedWith(rel) => &rel.id,
            Edge::WasDerivedFrom(rel) => &rel.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Edge::Used(_) => prov_relations::USED,
            Edge::WasGeneratedBy(_) => prov_relations::WAS_GENERATED_BY,
            Edge::WasAssociatedWith(_) => prov_relations::WAS_ASSOCIATED_WITH,
            Edge::WasDerivedFrom(_) => prov_relations::WAS_DERIVED_FROM,
        }
    }

    pub fn annotations(&self) -> &Annotations {
        match self {
            Edge::Used(rel) => &rel.annotations,
            Edge::WasGeneratedBy(rel) => &rel.annotations,
            Edge::WasAssociatedWith(rel) => &rel.annotations,
            Edge::WasDerivedFrom(rel) => &rel.annotations,
        }
    }

    /// Vertex the relation points from.
    pub fn source(&self) -> ProvNodeRef {
        match self {
            Edge::Used(rel) => ProvNodeRef::Activity(rel.activity.clone()),
            Edge::WasGeneratedBy(rel) => ProvNodeRef::Entity(rel.entity.clone()),
            Edge::WasAssociatedWith(rel) => ProvNodeRef::Activity(rel.activity.clone()),
            Edge::WasDerivedFrom(rel) => ProvNodeRef::Entity(rel.generated_entity.clone()),
        }
    }

    /// Vertex the relation points to.
    pub fn destination(&self) -> ProvNodeRef {
        match self {
            Edge::Used(rel) => ProvNodeRef::Entity(rel.entity.clone()),
            Edge::WasGeneratedBy(rel) => ProvNodeRef::Activity(rel.activity.clone()),
            Edge::WasAssociatedWith(rel) => ProvNodeRef::Agent(rel.agent.clone()),
            Edge::WasDerivedFrom(rel) => ProvNodeRef::Entity(rel.used_entity.clone()),
        }
    }
}

impl From<Used> for Edge {
    fn from(value: Used) -> Self {
        Edge::Used(value)
    }
}

impl From<WasGeneratedBy> for Edge {
    fn from(value: WasGeneratedBy) -> Self {
        Edge::WasGeneratedBy(value)
    }
}

impl From<WasAssociatedWith> for Edge {
    fn from(value: WasAssociatedWith) -> Self {
        Edge::WasAssociatedWith(value)
    }
}

impl From<WasDerivedFrom> for Edge {
    fn from(value: WasDerivedFrom) -> Self {
        Edge::WasDerivedFrom(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_from_points_from_new_to_previous() {
        let edge = Edge::from(WasDerivedFrom {
            id: EdgeId::new("d1"),
            generated_entity: ProvEntityId::new("entity:new"),
            used_entity: ProvEntityId::new("entity:old"),
            annotations: Annotations::new(),
        });
        assert_eq!(edge.kind(), "WasDerivedFrom");
        assert_eq!(edge.source(), ProvNodeRef::Entity(ProvEntityId::new("entity:new")));
        assert_eq!(edge.destination().id(), "entity:old");
        assert_eq!(edge.destination().label(), "Entity");
    }

    #[test]
    fn vertex_serializes_with_kind_tag() {
        let mut annotations = Annotations::new();
        annotations.insert("agent_type".to_string(), "Switch".to_string());
        let vertex = Vertex::from(Agent { id: ProvAgentId::new("agent:1:0"), annotations });
        let value = serde_json::to_value(&vertex).unwrap();
        assert_eq!(value["kind"], "Agent");
        assert_eq!(value["id"], "agent:1:0");
        assert_eq!(value["annotations"]["agent_type"], "Switch");
        let back: Vertex = serde_json::from_value(value).unwrap();
        assert_eq!(back, vertex);
    }
}
