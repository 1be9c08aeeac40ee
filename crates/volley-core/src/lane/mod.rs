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

//! # Lane Abstraction
//!
//! A **Lane** is a swappable processing strategy owned by an agent. Each lane
//! encapsulates one algorithmic approach to a dispenser task (target
//! acquisition, launch impulses, homing). Domain-specific execution methods
//! live on the concrete lane types; this trait carries only their identity so
//! agents can log and select them uniformly.

use std::fmt;

/// Classification of lane types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Line-of-sight target acquisition.
    Targeting,
    /// Initial impulses applied when an object is dispensed.
    Launch,
    /// Periodic steering of live objects toward a target.
    Homing,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaneKind::Targeting => "targeting",
            LaneKind::Launch => "launch",
            LaneKind::Homing => "homing",
        };
        f.write_str(name)
    }
}

/// Identity shared by every lane.
pub trait Lane: Send + Sync {
    /// A short, stable name for the strategy (e.g. `"FirstQualifyingHit"`).
    fn strategy_name(&self) -> &'static str;

    /// The kind of work this lane performs.
    fn lane_kind(&self) -> LaneKind;

    /// `kind/strategy` label used in logs.
    fn label(&self) -> String {
        format!("{}/{}", self.lane_kind(), self.strategy_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyLane;

    impl Lane for DummyLane {
        fn strategy_name(&self) -> &'static str {
            "Dummy"
        }

        fn lane_kind(&self) -> LaneKind {
            LaneKind::Homing
        }
    }

    #[test]
    fn test_label_combines_kind_and_strategy() {
        assert_eq!(DummyLane.label(), "homing/Dummy");
    }
}
