use p4prov_core::AgentId;
use p4prov_provenance::{Activity, Agent, ProvActivityId};
use std::collections::{HashMap, HashSet};

/// Last-seen Agent and Activity vertex per device agent id.
///
/// Both maps are last-write-wins and keep no history; they exist only to
/// correlate later messages with the vertices that announced them.
/// Activities that already carry a WasAssociatedWith edge are remembered so
/// a repeated AGENT announcement does not associate them a second time.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    agents: HashMap<AgentId, Agent>,
    activities: HashMap<AgentId, Activity>,
    associated: HashSet<ProvActivityId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the agent previously registered under `agent_id`, if any.
    pub fn register_agent(&mut self, agent_id: AgentId, agent: Agent) -> Option<Agent> {
        self.agents.insert(agent_id, agent)
    }

    /// Returns the activity previously registered under `agent_id`, if any.
    pub fn register_activity(&mut self, agent_id: AgentId, activity: Activity) -> Option<Activity> {
        self.activities.insert(agent_id, activity)
    }

    pub fn agent_of(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    pub fn activity_of(&self, agent_id: &AgentId) -> Option<&Activity> {
        self.activities.get(agent_id)
    }

    pub fn mark_associated(&mut self, activity: &ProvActivityId) {
        self.associated.insert(activity.clone());
    }

    pub fn is_associated(&self, activity: &ProvActivityId) -> bool {
        self.associated.contains(activity)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.activities.is_empty()
    }
}
