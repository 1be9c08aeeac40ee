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

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use volley_core::physics::{BodyHost, HandleInvalid, RigidBodyHandle};
use volley_lanes::{HomingPhase, HomingTask};

/// Monotonic registration counter. Each TTL timer carries the sequence it
/// was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnSequence(pub u64);

impl fmt::Display for SpawnSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spawn#{}", self.0)
    }
}

/// A live object tracked from factory success until it is destroyed.
#[derive(Debug)]
pub struct SpawnedObject {
    sequence: SpawnSequence,
    handle: RigidBodyHandle,
    created_at: Instant,
    ttl: Duration,
    homing: Option<HomingTask>,
}

impl SpawnedObject {
    /// Registration order of this object.
    pub fn sequence(&self) -> SpawnSequence {
        self.sequence
    }

    /// Host body behind this object.
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    /// When the object was registered.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Lifetime granted at registration.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Instant at which the TTL timer fires.
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.ttl
    }

    /// `true` while a homing ticker is attached and has not terminated.
    pub fn homing_active(&self) -> bool {
        self.homing
            .as_ref()
            .is_some_and(|task| task.phase() != HomingPhase::Terminated)
    }

    fn destroy(mut self, bodies: &dyn BodyHost) {
        if let Some(mut task) = self.homing.take() {
            task.cancel();
        }
        match bodies.destroy(self.handle) {
            Ok(()) => log::info!("Destroyed {} ({}).", self.handle, self.sequence),
            Err(HandleInvalid(handle)) => {
                log::debug!("{handle} was already gone when {} expired.", self.sequence)
            }
        }
    }
}

/// Result of [`LifecycleRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Sequence assigned to the new entry.
    pub sequence: SpawnSequence,
    /// Oldest entry evicted to respect the live-object cap, if any.
    pub displaced: Option<RigidBodyHandle>,
}

/// Creation-ordered registry of live spawned objects.
///
/// The head is always the oldest entry. Every removal cancels the entry's
/// homing ticker before destroying its body, and each entry leaves the
/// registry exactly once.
pub struct LifecycleRegistry {
    entries: VecDeque<SpawnedObject>,
    next_sequence: u64,
    max_live: Option<usize>,
    bodies: Arc<dyn BodyHost>,
}

impl LifecycleRegistry {
    /// Creates an empty registry destroying bodies through `bodies`.
    ///
    /// With `max_live` set, registering beyond the cap first evicts the
    /// oldest entry.
    pub fn new(bodies: Arc<dyn BodyHost>, max_live: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            next_sequence: 0,
            max_live,
            bodies,
        }
    }

    /// Appends `handle` at the tail with the given lifetime.
    pub fn register(&mut self, handle: RigidBodyHandle, ttl: Duration) -> Registration {
        let displaced = match self.max_live {
            Some(cap) if self.entries.len() >= cap => {
                let evicted = self.evict_oldest();
                if let Some(evicted) = evicted {
                    log::info!("Live object cap ({cap}) reached; evicted {evicted} early.");
                }
                evicted
            }
            _ => None,
        };

        let sequence = SpawnSequence(self.next_sequence);
        self.next_sequence += 1;
        self.entries.push_back(SpawnedObject {
            sequence,
            handle,
            created_at: Instant::now(),
            ttl,
            homing: None,
        });
        log::debug!("Registered {handle} as {sequence}, ttl {ttl:?}.");

        Registration {
            sequence,
            displaced,
        }
    }

    /// Attaches the homing ticker of an entry. Returns `false` (and cancels
    /// the task) when the entry is no longer live or the task steers another
    /// body.
    pub fn attach_homing(&mut self, sequence: SpawnSequence, mut task: HomingTask) -> bool {
        match self.entries.iter_mut().find(|e| e.sequence == sequence) {
            Some(entry) if entry.handle == task.handle() => {
                if let Some(mut previous) = entry.homing.replace(task) {
                    previous.cancel();
                }
                true
            }
            Some(entry) => {
                log::warn!(
                    "Homing task for {} does not match {} ({sequence}).",
                    task.handle(),
                    entry.handle
                );
                task.cancel();
                false
            }
            None => {
                task.cancel();
                false
            }
        }
    }

    /// Pops the oldest entry and destroys it. No-op on an empty registry.
    pub fn evict_oldest(&mut self) -> Option<RigidBodyHandle> {
        let entry = self.entries.pop_front()?;
        let handle = entry.handle;
        entry.destroy(self.bodies.as_ref());
        Some(handle)
    }

    /// Handles the TTL timer scheduled for `sequence`.
    ///
    /// Evicts the oldest entry unless the head is younger than `sequence`,
    /// meaning the entry the timer was scheduled for already left the
    /// registry through the cap or [`clear`](Self::clear).
    pub fn evict_expired(&mut self, sequence: SpawnSequence) -> Option<RigidBodyHandle> {
        match self.entries.front() {
            Some(head) if head.sequence <= sequence => self.evict_oldest(),
            Some(_) => {
                log::trace!("{sequence} already evicted; timer ignored.");
                None
            }
            None => None,
        }
    }

    /// Destroys every live entry, oldest first. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        while self.evict_oldest().is_some() {
            removed += 1;
        }
        removed
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The live entry registered as `sequence`.
    pub fn get(&self, sequence: SpawnSequence) -> Option<&SpawnedObject> {
        self.entries.iter().find(|e| e.sequence == sequence)
    }

    /// Returns `true` if `handle` is live.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Live entries in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnedObject> {
        self.entries.iter()
    }
}

impl fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("live", &self.entries.len())
            .field("next_sequence", &self.next_sequence)
            .field("max_live", &self.max_live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use volley_core::math::{Quat, Vec3};
    use volley_core::physics::{
        ActuationError, BodyType, CreationError, HostServices, ImpulseActuator, ObjectFactory,
        ObjectId, Ray, RaycastHit, SpatialQuery, SpawnRequest,
    };
    use volley_lanes::{FirstHitTargetingLane, HomingLane};

    /// Tracks which bodies exist and the order they were destroyed in.
    #[derive(Default)]
    struct Bodies {
        alive: Mutex<HashSet<RigidBodyHandle>>,
        destroyed: Mutex<Vec<RigidBodyHandle>>,
    }

    impl Bodies {
        fn with(handles: &[u64]) -> Arc<Self> {
            let bodies = Self::default();
            bodies
                .alive
                .lock()
                .unwrap()
                .extend(handles.iter().map(|h| RigidBodyHandle(*h)));
            Arc::new(bodies)
        }

        fn destroyed(&self) -> Vec<u64> {
            self.destroyed.lock().unwrap().iter().map(|h| h.0).collect()
        }
    }

    impl BodyHost for Bodies {
        fn find_rigid_body(&self, _: ObjectId) -> Option<RigidBodyHandle> {
            None
        }

        fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
            self.alive
                .lock()
                .unwrap()
                .contains(&handle)
                .then_some((Vec3::ZERO, Quat::IDENTITY))
        }

        fn set_motion_type(&self, _: RigidBodyHandle, _: BodyType) -> Result<(), HandleInvalid> {
            Ok(())
        }

        fn destroy(&self, handle: RigidBodyHandle) -> Result<(), HandleInvalid> {
            if !self.alive.lock().unwrap().remove(&handle) {
                return Err(HandleInvalid(handle));
            }
            self.destroyed.lock().unwrap().push(handle);
            Ok(())
        }

        fn has_template(&self, _: &str) -> bool {
            true
        }
    }

    #[async_trait]
    impl ObjectFactory for Bodies {
        async fn create(&self, _: SpawnRequest) -> Result<RigidBodyHandle, CreationError> {
            Err(CreationError::RateLimited)
        }
    }

    #[async_trait]
    impl ImpulseActuator for Bodies {
        async fn apply(&self, handle: RigidBodyHandle, _: Vec3) -> Result<(), ActuationError> {
            if self.alive.lock().unwrap().contains(&handle) {
                Ok(())
            } else {
                Err(HandleInvalid(handle).into())
            }
        }
    }

    impl SpatialQuery for Bodies {
        fn cast_ray(&self, _: &Ray, _: f32, _: usize) -> Vec<RaycastHit> {
            Vec::new()
        }
    }

    fn homing_lane() -> Arc<HomingLane> {
        let targeting = FirstHitTargetingLane::new(Vec3::FORWARD, 20.0, 10);
        Arc::new(HomingLane::new(Duration::from_millis(100), 50.0, targeting))
    }

    const TTL: Duration = Duration::from_secs(10);

    #[test]
    fn test_eviction_is_fifo() {
        let bodies = Bodies::with(&[1, 2, 3]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        for h in [1, 2, 3] {
            registry.register(RigidBodyHandle(h), TTL);
        }

        assert_eq!(registry.evict_oldest(), Some(RigidBodyHandle(1)));
        assert_eq!(registry.evict_oldest(), Some(RigidBodyHandle(2)));
        assert_eq!(registry.len(), 1);
        assert_eq!(bodies.destroyed(), vec![1, 2]);
    }

    #[test]
    fn test_evict_on_empty_registry_is_noop() {
        let bodies = Bodies::with(&[]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);

        assert_eq!(registry.evict_oldest(), None);
        assert_eq!(registry.evict_expired(SpawnSequence(0)), None);
        assert_eq!(registry.clear(), 0);
        assert!(bodies.destroyed().is_empty());
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let bodies = Bodies::with(&[7, 8]);
        let mut registry = LifecycleRegistry::new(bodies, None);

        let first = registry.register(RigidBodyHandle(7), TTL).sequence;
        let second = registry.register(RigidBodyHandle(8), TTL).sequence;

        assert!(first < second);
        let order: Vec<_> = registry.iter().map(|e| e.sequence()).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn test_cap_evicts_oldest_before_registering() {
        let bodies = Bodies::with(&[1, 2, 3]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), Some(2));

        let first = registry.register(RigidBodyHandle(1), TTL);
        registry.register(RigidBodyHandle(2), TTL);
        let third = registry.register(RigidBodyHandle(3), TTL);

        assert_eq!(third.displaced, Some(RigidBodyHandle(1)));
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(RigidBodyHandle(1)));

        // The displaced entry's timer must not evict its successor early.
        assert_eq!(registry.evict_expired(first.sequence), None);
        assert_eq!(registry.len(), 2);
        assert_eq!(bodies.destroyed(), vec![1]);
    }

    #[test]
    fn test_expired_timer_evicts_head() {
        let bodies = Bodies::with(&[1, 2]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        let first = registry.register(RigidBodyHandle(1), TTL);
        let second = registry.register(RigidBodyHandle(2), TTL);

        assert_eq!(registry.evict_expired(first.sequence), Some(RigidBodyHandle(1)));
        assert_eq!(registry.evict_expired(second.sequence), Some(RigidBodyHandle(2)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_destroys_oldest_first_and_once() {
        let bodies = Bodies::with(&[4, 5, 6]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        let seqs: Vec<_> = [4, 5, 6]
            .into_iter()
            .map(|h| registry.register(RigidBodyHandle(h), TTL).sequence)
            .collect();

        assert_eq!(registry.clear(), 3);
        for seq in seqs {
            assert_eq!(registry.evict_expired(seq), None);
        }
        assert_eq!(bodies.destroyed(), vec![4, 5, 6]);
    }

    #[test]
    fn test_stale_handle_is_dropped_quietly() {
        let bodies = Bodies::with(&[]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        registry.register(RigidBodyHandle(9), TTL);

        assert_eq!(registry.evict_oldest(), Some(RigidBodyHandle(9)));
        assert!(registry.is_empty());
        assert!(bodies.destroyed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_is_creation_time_plus_ttl() {
        let bodies = Bodies::with(&[1]);
        let mut registry = LifecycleRegistry::new(bodies, None);
        let before = Instant::now();
        let sequence = registry.register(RigidBodyHandle(1), TTL).sequence;

        let entry = registry.get(sequence).unwrap();
        assert_eq!(entry.created_at(), before);
        assert_eq!(entry.ttl(), TTL);
        assert_eq!(entry.expires_at(), before + TTL);
        assert!(!entry.homing_active());
        assert!(registry.get(SpawnSequence(sequence.0 + 1)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_homing_inactive_after_cancellation() {
        let bodies = Bodies::with(&[1]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        let sequence = registry.register(RigidBodyHandle(1), TTL).sequence;
        let task = homing_lane().start(RigidBodyHandle(1), HostServices::from_host(bodies));

        assert!(registry.attach_homing(sequence, task));
        assert!(registry.get(sequence).unwrap().homing_active());

        if let Some(task) = registry.entries[0].homing.as_mut() {
            task.cancel();
        }
        assert!(!registry.get(sequence).unwrap().homing_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_homing_inactive_once_handle_goes_stale() {
        let bodies = Bodies::with(&[1]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        let sequence = registry.register(RigidBodyHandle(1), TTL).sequence;
        let task = homing_lane().start(RigidBodyHandle(1), HostServices::from_host(bodies.clone()));
        registry.attach_homing(sequence, task);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(registry.get(sequence).unwrap().homing_active());

        bodies.alive.lock().unwrap().remove(&RigidBodyHandle(1));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let entry = registry.get(sequence).unwrap();
        assert!(!entry.homing_active());
        assert!(registry.contains(RigidBodyHandle(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_homing_for_another_body_is_refused() {
        let bodies = Bodies::with(&[1, 2]);
        let mut registry = LifecycleRegistry::new(bodies.clone(), None);
        let sequence = registry.register(RigidBodyHandle(1), TTL).sequence;
        let task = homing_lane().start(RigidBodyHandle(2), HostServices::from_host(bodies));

        assert!(!registry.attach_homing(sequence, task));
        assert!(!registry.get(sequence).unwrap().homing_active());
    }
}
