// ── Synchronization repository ──
//
// Adapts wire shapes from the hub client into sequences of typed
// entities. Stateless; cannot fail independently of its collaborator,
// and holds no retry logic of its own.

use hearth_api::{HubClient, ServiceAction};

use crate::entity::{Entity, classify};
use crate::error::CoreError;

/// Wire-to-domain adapter over a [`HubClient`].
pub struct EntityRepository {
    client: HubClient,
}

impl EntityRepository {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    /// Fetch all entities the hub knows about, classified and with
    /// unrecognized domains dropped. Hub response order is preserved.
    pub async fn fetch_entities(&self) -> Result<Vec<Entity>, CoreError> {
        let states = self.client.list_states().await?;
        Ok(states.iter().filter_map(classify).collect())
    }

    /// Fetch one entity by id. `Ok(None)` means the hub knows the id
    /// but its domain is outside the classified set.
    pub async fn fetch_entity(&self, entity_id: &str) -> Result<Option<Entity>, CoreError> {
        match self.client.get_state(entity_id).await {
            Ok(state) => Ok(classify(&state)),
            Err(hearth_api::Error::Status { status: 404, .. }) => Err(CoreError::EntityNotFound {
                entity_id: entity_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Forward a state-changing action to the hub unchanged.
    pub async fn send_action(
        &self,
        entity_id: &str,
        action: ServiceAction,
    ) -> Result<(), CoreError> {
        Ok(self.client.invoke(entity_id, action).await?)
    }
}
