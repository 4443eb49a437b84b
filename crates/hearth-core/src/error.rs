use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A hub API call failed; the message carries the transport /
    /// status / decode detail from the client layer.
    #[error(transparent)]
    Api(#[from] hearth_api::Error),

    /// The hub has no state record for the requested entity id.
    #[error("entity '{entity_id}' not found on the hub")]
    EntityNotFound { entity_id: String },
}
