use crate::types::{
    Activity, Agent, Annotations, Edge, EdgeId, Entity, ProvActivityId, ProvAgentId,
    ProvEntityId, Used, WasAssociatedWith, WasDerivedFrom, WasGeneratedBy,
};

macro_rules! define_vertex_builder {
    ($(#[$doc:meta])* $builder:ident, $id:ty, $vertex:ident) => {
        $(#[$doc])*
        pub struct $builder {
            id: $id,
            annotations: Annotations,
        }

        impl $builder {
            pub fn new(id: impl Into<String>) -> Self {
                Self { id: <$id>::new(id), annotations: Annotations::new() }
            }

            pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
                self.annotations.insert(key.to_string(), value.into());
                self
            }

            pub fn attrs<I, K, V>(mut self, attrs: I) -> Self
            where
                I: IntoIterator<Item = (K, V)>,
                K: Into<String>,
                V: Into<String>,
            {
                self.annotations
                    .extend(attrs.into_iter().map(|(key, value)| (key.into(), value.into())));
                self
            }

            pub fn build(self) -> $vertex {
                $vertex { id: self.id, annotations: self.annotations }
            }
        }
    };
}

define_vertex_builder!(
    /// Builds an `Entity` vertex.
    EntityBuilder,
    ProvEntityId,
    Entity
);
define_vertex_builder!(
    /// Builds an `Activity` vertex.
    ActivityBuilder,
    ProvActivityId,
    Activity
);
define_vertex_builder!(
    /// Builds an `Agent` vertex.
    AgentBuilder,
    ProvAgentId,
    Agent
);

pub struct UsedBuilder {
    id: EdgeId,
    activity: ProvActivityId,
    entity: ProvEntityId,
    annotations: Annotations,
}

impl UsedBuilder {
    pub fn new(id: EdgeId, activity: &Activity, entity: &Entity) -> Self {
        Self {
            id,
            activity: activity.id.clone(),
            entity: entity.id.clone(),
            annotations: Annotations::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Edge {
        Edge::Used(Used {
            id: self.id,
            activity: self.activity,
            entity: self.entity,
            annotations: self.annotations,
        })
    }
}

pub struct WasGeneratedByBuilder {
    id: EdgeId,
    entity: ProvEntityId,
    activity: ProvActivityId,
    annotations: Annotations,
}

impl WasGeneratedByBuilder {
    pub fn new(id: EdgeId, entity: &Entity, activity: &Activity) -> Self {
        Self {
            id,
            entity: entity.id.clone(),
            activity: activity.id.clone(),
            annotations: Annotations::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Edge {
        Edge::WasGeneratedBy(WasGeneratedBy {
            id: self.id,
            entity: self.entity,
            activity: self.activity,
            annotations: self.annotations,
        })
    }
}

pub struct WasAssociatedWithBuilder {
    id: EdgeId,
    activity: ProvActivityId,
    agent: ProvAgentId,
    annotations: Annotations,
}

impl WasAssociatedWithBuilder {
    pub fn new(id: EdgeId, activity: &Activity, agent: &Agent) -> Self {
        Self {
            id,
            activity: activity.id.clone(),
            agent: agent.id.clone(),
            annotations: Annotations::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Edge {
        Edge::WasAssociatedWith(WasAssociatedWith {
            id: self.id,
            activity: self.activity,
            agent: self.agent,
            annotations: self.annotations,
        })
    }
}

pub struct WasDerivedFromBuilder {
    id: EdgeId,
    generated_entity: ProvEntityId,
    used_entity: ProvEntityId,
    annotations: Annotations,
}

impl WasDerivedFromBuilder {
    pub fn new(id: EdgeId, generated_entity: &Entity, used_entity: &Entity) -> Self {
        Self {
            id,
            generated_entity: generated_entity.id.clone(),
            used_entity: used_entity.id.clone(),
            annotations: Annotations::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Edge {
        Edge::WasDerivedFrom(WasDerivedFrom {
            id: self.id,
            generated_entity: self.generated_entity,
            used_entity: self.used_entity,
            annotations: self.annotations,
        })
    }
}
