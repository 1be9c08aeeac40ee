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

//! Line-of-sight target acquisition.
//!
//! A probe is a fresh ray cast from the object's position along a fixed scene
//! axis. The first hit whose object carries both a rigid body and a character
//! marker wins; later hits are never considered.

mod lane;

pub use lane::*;
