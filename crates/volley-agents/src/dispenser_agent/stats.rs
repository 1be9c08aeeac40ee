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

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Live counters of a dispenser, shared between the agent and its handles.
#[derive(Debug, Default)]
pub struct DispenserStats {
    triggers: AtomicU64,
    auto_shots: AtomicU64,
    spawn_requests: AtomicU64,
    spawned: AtomicU64,
    throttled: AtomicU64,
    creation_failures: AtomicU64,
    actuation_failures: AtomicU64,
    evicted: AtomicU64,
    live: AtomicUsize,
}

/// Point-in-time copy of [`DispenserStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Trigger events received, including ignored ones.
    pub triggers: u64,
    /// Auto-fire shots aimed at a target.
    pub auto_shots: u64,
    /// Creation requests sent to the factory.
    pub spawn_requests: u64,
    /// Objects that made it into the registry.
    pub spawned: u64,
    /// Creations rejected with `RateLimited`.
    pub throttled: u64,
    /// Creations rejected for any other reason.
    pub creation_failures: u64,
    /// Recoil or launch impulses the host rejected.
    pub actuation_failures: u64,
    /// Objects destroyed by TTL, cap or shutdown.
    pub evicted: u64,
    /// Objects currently registered.
    pub live: usize,
}

impl DispenserStats {
    /// Copies every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            triggers: self.triggers.load(Ordering::Relaxed),
            auto_shots: self.auto_shots.load(Ordering::Relaxed),
            spawn_requests: self.spawn_requests.load(Ordering::Relaxed),
            spawned: self.spawned.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            creation_failures: self.creation_failures.load(Ordering::Relaxed),
            actuation_failures: self.actuation_failures.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_trigger(&self) {
        self.triggers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_auto_shot(&self) {
        self.auto_shots.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawn_request(&self) {
        self.spawn_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawned(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_creation_failure(&self) {
        self.creation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_actuation_failure(&self) {
        self.actuation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self, count: u64) {
        self.evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn set_live(&self, live: usize) {
        self.live.store(live, Ordering::Relaxed);
    }
}
