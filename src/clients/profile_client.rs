use super::error::ProfileError;
use crate::model::{ActionHash, AgentPubKey, Profile, Record};
use crate::runtime::{call, zome, CallTarget, RuntimeClient, RuntimeError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Best-effort display-name lookup for a participant.
///
/// `Ok(None)` means the participant has no usable name; callers pick a fallback.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn display_name(&self, agent: &AgentPubKey) -> Result<Option<String>, ProfileError>;
}

/// Reads profiles through the `profiles` zome.
#[derive(Clone)]
pub struct RuntimeProfiles {
    runtime: Arc<dyn RuntimeClient>,
    role: String,
    zome: String,
}

impl RuntimeProfiles {
    pub fn new(runtime: Arc<dyn RuntimeClient>, role: impl Into<String>, zome: impl Into<String>) -> Self {
        Self {
            runtime,
            role: role.into(),
            zome: zome.into(),
        }
    }

    /// Publish the local participant's profile.
    pub async fn create_profile(&self, profile: &Profile) -> Result<ActionHash, RuntimeError> {
        call(
            self.runtime.as_ref(),
            CallTarget::role(self.role.as_str()),
            &self.zome,
            zome::CREATE_PROFILE,
            profile,
        )
        .await
    }
}

#[async_trait]
impl ProfileLookup for RuntimeProfiles {
    #[instrument(skip(self, agent), fields(agent = %agent))]
    async fn display_name(&self, agent: &AgentPubKey) -> Result<Option<String>, ProfileError> {
        let record: Option<Record> = call(
            self.runtime.as_ref(),
            CallTarget::role(self.role.as_str()),
            &self.zome,
            zome::GET_AGENT_PROFILE,
            agent,
        )
        .await?;

        let Some(bytes) = record.as_ref().and_then(Record::entry_bytes) else {
            debug!("No profile");
            return Ok(None);
        };
        let profile: Profile =
            rmp_serde::from_slice(bytes).map_err(|e| ProfileError::Malformed(e.to_string()))?;
        Ok(profile.name().map(str::to_string))
    }
}

/// Scripted [`ProfileLookup`] for tests and demos. Unknown agents have no profile.
#[derive(Default, Clone)]
pub struct StaticProfiles {
    answers: HashMap<AgentPubKey, Result<Option<String>, ProfileError>>,
}

impl StaticProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, agent: AgentPubKey, name: impl Into<String>) -> Self {
        self.answers.insert(agent, Ok(Some(name.into())));
        self
    }

    /// The agent has a profile without any name field.
    pub fn with_nameless(mut self, agent: AgentPubKey) -> Self {
        self.answers.insert(agent, Ok(None));
        self
    }

    pub fn with_failure(mut self, agent: AgentPubKey, error: ProfileError) -> Self {
        self.answers.insert(agent, Err(error));
        self
    }
}

#[async_trait]
impl ProfileLookup for StaticProfiles {
    async fn display_name(&self, agent: &AgentPubKey) -> Result<Option<String>, ProfileError> {
        self.answers.get(agent).cloned().unwrap_or(Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::memory::MemoryNetwork;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn reads_name_from_published_profile() {
        let network = MemoryNetwork::new();
        let alice = AgentPubKey(vec![1; 32]);
        let runtime: Arc<dyn RuntimeClient> = Arc::new(network.connect(alice.clone()));
        let profiles = RuntimeProfiles::new(runtime, zome::CART_ROLE, zome::PROFILES_ZOME);

        assert_eq!(profiles.display_name(&alice).await.unwrap(), None);

        let profile = Profile {
            fields: BTreeMap::from([("nickname".to_string(), "alice".to_string())]),
            ..Default::default()
        };
        profiles.create_profile(&profile).await.unwrap();

        assert_eq!(
            profiles.display_name(&alice).await.unwrap(),
            Some("alice".to_string())
        );
    }
}
