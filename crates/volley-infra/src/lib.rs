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

//! # Volley Infra
//!
//! Concrete host implementations: a Rapier3D scene implementing every
//! dispenser host contract, and the creation throttle it enforces.

#![warn(missing_docs)]

pub mod physics;
pub mod throttle;

pub use physics::rapier::{BodyTemplate, RapierHost, RapierScene, TemplateShape};
pub use throttle::CreationThrottle;
