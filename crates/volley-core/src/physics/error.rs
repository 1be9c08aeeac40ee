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

//! Error types reported by the physics host.

use thiserror::Error;

use super::RigidBodyHandle;

/// The handle no longer resolves to a live body.
///
/// Always benign: the body was removed by the host or by an earlier eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is no longer valid")]
pub struct HandleInvalid(pub RigidBodyHandle);

/// Why the host refused to create a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    /// The host throttled creation; the attempt is dropped, never retried.
    #[error("creation request throttled by the host")]
    RateLimited,
    /// The host does not know the requested template.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    /// Any other host-side failure.
    #[error("creation rejected: {0}")]
    Rejected(String),
}

/// Why the host refused to apply an impulse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuationError {
    /// The target body vanished before the impulse landed.
    #[error(transparent)]
    HandleInvalid(#[from] HandleInvalid),
    /// The impulse itself was unusable (e.g. not finite).
    #[error("impulse rejected: {0}")]
    Rejected(String),
}
