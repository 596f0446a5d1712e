// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
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

//! Core emulation components
//!
//! This module contains all hardware emulation components:
//! - Geometry engine (GXFIFO, matrix stacks, vertex and polygon RAM)
//! - Interrupt controller
//! - Timing (event scheduler)
//! - System integration, register scripts and save states

pub mod config;
pub mod error;
pub mod gx;
pub mod interrupt;
pub mod save_state;
pub mod script;
pub mod system;
pub mod timing;

// Re-export commonly used types
pub use config::{Config, GeometryConfig};
pub use error::{EmulatorError, GeometryError, Result};
pub use gx::GeometryEngine;
pub use interrupt::InterruptController;
pub use save_state::SaveState;
pub use script::{Script, ScriptReport};
pub use system::System;
pub use timing::{Scheduler, TimingEventManager};
