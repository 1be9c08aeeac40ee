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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use volley_core::physics::RigidBodyHandle;

/// Homing state of a single spawned object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingPhase {
    /// The ticker was spawned but has not been polled yet.
    Inactive,
    /// The object is ticking.
    Active,
    /// Homing ended for good; it is never restarted for the same object.
    Terminated,
}

/// Owner of one object's homing ticker.
///
/// Cancelling (or dropping) the task stops the ticker before its next poll,
/// so no impulse is issued for the object afterwards.
#[derive(Debug)]
pub struct HomingTask {
    handle: RigidBodyHandle,
    join: JoinHandle<()>,
    started: Arc<AtomicBool>,
    cancelled: bool,
}

impl HomingTask {
    pub(crate) fn new(
        handle: RigidBodyHandle,
        join: JoinHandle<()>,
        started: Arc<AtomicBool>,
    ) -> Self {
        Self {
            handle,
            join,
            started,
            cancelled: false,
        }
    }

    /// The object being steered.
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    /// Stops homing. Idempotent.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.join.abort();
            self.cancelled = true;
        }
    }

    /// Current phase; never leaves `Terminated` once reached.
    pub fn phase(&self) -> HomingPhase {
        if self.cancelled || self.join.is_finished() {
            HomingPhase::Terminated
        } else if self.started.load(Ordering::Acquire) {
            HomingPhase::Active
        } else {
            HomingPhase::Inactive
        }
    }
}

impl Drop for HomingTask {
    fn drop(&mut self) {
        self.join.abort();
    }
}
