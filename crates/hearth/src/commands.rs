//! Command handlers.
//!
//! One-shot commands build an engine with the periodic loop disabled
//! and drive a single refresh / command cycle; `watch` runs the loop
//! at its default cadence until interrupted.

use std::time::Duration;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use hearth_api::HubClient;
use hearth_core::{EngineConfig, Entity, EntityRepository, ServiceAction, SyncEngine, SyncState};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Entity> for EntityRow {
    fn from(entity: &Entity) -> Self {
        let state = match entity {
            Entity::Sensor {
                state,
                unit: Some(unit),
                ..
            } => format!("{state} {unit}"),
            other => other.state().to_owned(),
        };
        Self {
            id: entity.id().to_owned(),
            name: entity.name().to_owned(),
            kind: entity.kind().to_owned(),
            state,
        }
    }
}

// ── Plumbing ────────────────────────────────────────────────────────

/// Resolve connection settings: config file + env, then CLI overrides.
fn resolve_settings(global: &GlobalOpts) -> Result<hearth_config::Settings, CliError> {
    let mut settings = hearth_config::load_settings()?;
    if let Some(url) = &global.url {
        settings.url.clone_from(url);
    }
    if let Some(token) = &global.token {
        settings.token.clone_from(token);
    }
    if !settings.is_configured() {
        return Err(CliError::NotConfigured);
    }
    Ok(settings)
}

fn build_repository(global: &GlobalOpts) -> Result<EntityRepository, CliError> {
    let settings = resolve_settings(global)?;
    let client = HubClient::new(&settings.url, &settings.token_secret())?;
    Ok(EntityRepository::new(client))
}

fn build_engine(global: &GlobalOpts, poll_interval: Duration) -> Result<SyncEngine, CliError> {
    Ok(SyncEngine::new(
        build_repository(global)?,
        EngineConfig { poll_interval },
    ))
}

/// Surface a failed refresh / command as a CLI error.
fn check_sync(state: &SyncState) -> Result<(), CliError> {
    match &state.error {
        Some(message) => Err(CliError::SyncFailed {
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

fn print_entities(entities: &[Entity]) {
    let rows: Vec<EntityRow> = entities.iter().map(EntityRow::from).collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
}

fn print_detail(entity: &Entity) {
    println!("ID:     {}", entity.id());
    println!("Name:   {}", entity.name());
    println!("Kind:   {}", entity.kind());
    println!("State:  {}", entity.state());
    if let Entity::Sensor {
        unit: Some(unit), ..
    } = entity
    {
        println!("Unit:   {unit}");
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn login(url: &str, token: &str) -> Result<(), CliError> {
    let settings = hearth_config::Settings {
        url: url.to_owned(),
        token: token.to_owned(),
    };
    let path = hearth_config::save_settings(&settings)?;
    println!("Settings saved to {}", path.display());
    Ok(())
}

pub async fn entities(global: &GlobalOpts) -> Result<(), CliError> {
    let engine = build_engine(global, Duration::ZERO)?;
    engine.refresh(true).await;

    let state = engine.state();
    check_sync(&state)?;
    print_entities(&state.entities);
    Ok(())
}

pub async fn state(global: &GlobalOpts, entity_id: &str) -> Result<(), CliError> {
    let repository = build_repository(global)?;
    let entity = repository.fetch_entity(entity_id).await?.ok_or_else(|| {
        CliError::UnsupportedEntity {
            entity_id: entity_id.to_owned(),
        }
    })?;
    print_detail(&entity);
    Ok(())
}

/// Dispatch a command through the engine and print the reconciled entity.
pub async fn command(
    global: &GlobalOpts,
    entity_id: &str,
    action: ServiceAction,
) -> Result<(), CliError> {
    let engine = build_engine(global, Duration::ZERO)?;

    match action {
        ServiceAction::Toggle => engine.toggle_entity(entity_id).await,
        ServiceAction::TurnOn => engine.turn_on(entity_id).await,
        ServiceAction::TurnOff => engine.turn_off(entity_id).await,
    }

    let state = engine.state();
    check_sync(&state)?;

    match state.entities.iter().find(|e| e.id() == entity_id) {
        Some(entity) => print_detail(entity),
        None => println!("{entity_id}: command accepted"),
    }
    Ok(())
}

pub async fn watch(global: &GlobalOpts) -> Result<(), CliError> {
    let engine = build_engine(global, EngineConfig::default().poll_interval)?;
    let mut rx = engine.subscribe();
    engine.start().await;

    print_snapshot(&engine.state());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

fn print_snapshot(state: &SyncState) {
    let connectivity = if state.is_connected {
        "connected"
    } else {
        "disconnected"
    };
    match &state.error {
        Some(error) => println!("[{connectivity}] {error}"),
        None => println!("[{connectivity}] {} entities", state.entities.len()),
    }
    print_entities(&state.entities);
}
