// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dispenser Agent
//!
//! Orchestrates the dispenser pipeline for one triggering source:
//!
//! ```text
//! trigger -> create (async) -> set dynamic -> register -> homing + TTL timer
//!                                          \-> launch impulse (async)
//! TTL timer -> evict oldest -> cancel homing -> destroy
//! auto-fire timer -> aim at first character -> create with initial velocity
//! ```
//!
//! All registry mutations happen on the agent's event loop. Host calls and
//! timers run as tokio tasks and report back through the agent's internal
//! [`EventBus`](volley_core::event::EventBus). Triggers and shutdown arrive on
//! a separate command bus fed by [`DispenserHandle`]s; once every handle is
//! dropped the agent shuts down on its own.

mod agent;
mod registry;
mod stats;

pub use agent::*;
pub use registry::*;
pub use stats::*;

use thiserror::Error;
use volley_core::config::ConfigError;
use volley_core::event::TriggerEvent;
use volley_core::math::Vec3;
use volley_core::physics::{CreationError, ObjectId, RigidBodyHandle};

/// Events consumed by the dispenser loop.
#[derive(Debug, Clone, PartialEq)]
pub enum DispenserEvent {
    /// An interaction hit the dispenser.
    Triggered(TriggerEvent),
    /// The factory answered a creation request.
    SpawnCompleted {
        /// Launch impulse to apply once the body is dynamic.
        launch: Vec3,
        /// Factory outcome.
        result: Result<RigidBodyHandle, CreationError>,
    },
    /// The TTL timer of a registration fired.
    TtlElapsed(SpawnSequence),
    /// The auto-fire timer fired.
    AutoFire,
    /// Destroy everything and stop the loop.
    Shutdown,
}

/// Reasons a dispenser is disabled or a trigger is ignored.
#[derive(Debug, Error)]
pub enum DispenserError {
    /// No template was configured.
    #[error("no dispense template configured")]
    MissingTemplate,
    /// The host does not know the configured template.
    #[error("dispense template '{0}' is unknown to the host")]
    UnknownTemplate(String),
    /// The configuration failed validation.
    #[error("invalid dispenser configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The triggering object has no physics body.
    #[error("{0} has no rigid body")]
    MissingRigidBody(ObjectId),
}
