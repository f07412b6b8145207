//! Configuration channel
//!
//! The only writer of [`SceneSnapshot`]. Commands are validated against the
//! catalog, queued in arrival order and applied one at a time; each accepted
//! command replaces exactly one snapshot field and publishes the new
//! immutable snapshot to every subscriber.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::channel::mpsc;

use crate::core::catalog::{Catalog, CatalogKind};
use crate::core::config::SelectionDefaults;
use crate::error::{ConfiguratorError, ErrorReporter};
use crate::foundation::math::utils;
use crate::scene::snapshot::{
    EngravingLimits, EngravingState, EngravingStyle, SceneSnapshot, SnapshotField,
};

/// A typed configuration command
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Switch the model variant
    SelectModel(String),
    /// Switch the metal finish (aliases accepted)
    SelectMetal(String),
    /// Switch the gem variant
    SelectGem(String),
    /// Replace the engraving text
    SetEngravingText(String),
    /// Update engraving layout fields
    SetEngravingStyle(EngravingStyle),
    /// Move the camera control (clamped to `[0, 1]`)
    SetCameraDistance(f32),
}

impl ConfigCommand {
    /// Snapshot field this command writes
    pub fn field(&self) -> SnapshotField {
        match self {
            Self::SelectModel(_) => SnapshotField::ModelVariant,
            Self::SelectMetal(_) => SnapshotField::MetalFinish,
            Self::SelectGem(_) => SnapshotField::GemVariant,
            Self::SetEngravingText(_) | Self::SetEngravingStyle(_) => SnapshotField::Engraving,
            Self::SetCameraDistance(_) => SnapshotField::Camera,
        }
    }
}

/// Channel processing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Waiting for commands
    Idle,
    /// Applying a command
    Applying,
}

/// A published snapshot and the field that changed
#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    /// The new snapshot
    pub snapshot: Arc<SceneSnapshot>,
    /// Field that differs from the previous snapshot
    pub field: SnapshotField,
}

/// Snapshot before any command is applied
pub fn initial_snapshot(
    catalog: &Catalog,
    defaults: &SelectionDefaults,
    engraving: EngravingState,
) -> SceneSnapshot {
    SceneSnapshot {
        model_variant: defaults.model.clone(),
        metal_finish: catalog.canonical_finish_id(&defaults.metal).to_string(),
        gem_variant: defaults.gem.clone(),
        engraving,
        camera: utils::saturate(defaults.camera),
        revision: 0,
    }
}

/// Validates commands and publishes snapshots
#[derive(Debug)]
pub struct ConfigurationChannel {
    catalog: Arc<Catalog>,
    snapshot: Arc<SceneSnapshot>,
    state: ChannelState,
    queue: VecDeque<ConfigCommand>,
    subscribers: Vec<mpsc::UnboundedSender<SnapshotUpdate>>,
    reset_engraving_on_model_change: bool,
    limits: EngravingLimits,
}

impl ConfigurationChannel {
    /// Create a channel publishing `initial` as its first snapshot
    pub fn new(catalog: Arc<Catalog>, initial: SceneSnapshot, reset_engraving_on_model_change: bool) -> Self {
        Self {
            catalog,
            snapshot: Arc::new(initial),
            state: ChannelState::Idle,
            queue: VecDeque::new(),
            subscribers: Vec::new(),
            reset_engraving_on_model_change,
            limits: EngravingLimits::default(),
        }
    }

    /// Accept engraving styles only within `limits`
    pub fn with_engraving_limits(mut self, limits: EngravingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &Arc<SceneSnapshot> {
        &self.snapshot
    }

    /// Current processing state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SnapshotUpdate> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Queue a command and apply everything queued
    ///
    /// Returns the number of snapshots published. Rejected commands are
    /// reported and leave the snapshot untouched.
    pub fn submit(&mut self, command: ConfigCommand, reporter: &mut dyn ErrorReporter) -> usize {
        self.queue.push_back(command);
        if self.state == ChannelState::Applying {
            return 0;
        }

        let mut published = 0;
        while let Some(command) = self.queue.pop_front() {
            self.state = ChannelState::Applying;
            match self.apply(command) {
                Ok(update) => {
                    self.publish(update);
                    published += 1;
                }
                Err(error) => reporter.report(error),
            }
            self.state = ChannelState::Idle;
        }
        published
    }

    fn apply(&mut self, command: ConfigCommand) -> Result<SnapshotUpdate, ConfiguratorError> {
        let field = command.field();
        let mut next = SceneSnapshot::clone(&self.snapshot);

        match command {
            ConfigCommand::SelectModel(id) => {
                Self::require(self.catalog.model(&id).is_some(), CatalogKind::Model.as_str(), &id)?;
                if self.reset_engraving_on_model_change
                    && id != next.model_variant
                    && !next.engraving.text.is_empty()
                {
                    self.queue
                        .push_front(ConfigCommand::SetEngravingText(String::new()));
                }
                next.model_variant = id;
            }
            ConfigCommand::SelectMetal(id) => {
                let canonical = self.catalog.finish(&id).map(|finish| finish.id.clone());
                next.metal_finish = canonical.ok_or_else(|| ConfiguratorError::Validation {
                    field: CatalogKind::Metal.as_str(),
                    key: id,
                })?;
            }
            ConfigCommand::SelectGem(id) => {
                Self::require(self.catalog.gem(&id).is_some(), CatalogKind::Gem.as_str(), &id)?;
                next.gem_variant = id;
            }
            ConfigCommand::SetEngravingText(text) => {
                next.engraving.text = text;
            }
            ConfigCommand::SetEngravingStyle(style) => {
                Self::require(style.is_within(&self.limits), "engraving style", &format!("{style:?}"))?;
                style.apply_to(&mut next.engraving);
            }
            ConfigCommand::SetCameraDistance(value) => {
                Self::require(value.is_finite(), "camera distance", &value.to_string())?;
                next.camera = utils::saturate(value);
            }
        }

        next.revision += 1;
        Ok(SnapshotUpdate {
            snapshot: Arc::new(next),
            field,
        })
    }

    fn require(valid: bool, field: &'static str, key: &str) -> Result<(), ConfiguratorError> {
        if valid {
            Ok(())
        } else {
            Err(ConfiguratorError::Validation {
                field,
                key: key.to_string(),
            })
        }
    }

    fn publish(&mut self, update: SnapshotUpdate) {
        log::debug!(
            "Published snapshot revision {} ({:?})",
            update.snapshot.revision,
            update.field
        );
        self.snapshot = Arc::clone(&update.snapshot);
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(update.clone()).is_ok());
    }
}
