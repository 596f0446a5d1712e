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

//! Save state serialization
//!
//! A save state captures everything needed to resume geometry processing
//! at the exact command boundary it was taken on.
//!
//! # Save State Format
//!
//! States are encoded with bincode's serde support (standard configuration).
//! The encoding starts with the format version, followed by:
//! - Metadata (timestamp, frame count)
//! - Geometry engine state (queue, staging register, matrix stacks, vertex
//!   and polygon RAM, render buffers, registers)
//! - Interrupt controller state (IME, IE, IF)
//!
//! Scheduler timing is not part of the state. The command busy latch is
//! dropped on restore and dispatch resumes immediately.
//!
//! # Version Compatibility
//!
//! Loading a state with a different version fails with
//! [`EmulatorError::SaveState`].
//!
//! # Example
//!
//! ```
//! use dsrx::core::save_state::SaveState;
//! use dsrx::core::System;
//!
//! let mut system = System::new();
//! let state = SaveState::from_system(&system);
//!
//! let bytes = state.to_bytes().unwrap();
//! let loaded = SaveState::from_bytes(&bytes).unwrap();
//! system.load_state(&loaded).unwrap();
//! ```

use std::path::Path;

use bincode::config;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{EmulatorError, Result};
use super::gx::{GeometryEngine, GeometryState};
use super::interrupt::{InterruptController, InterruptState};
use super::System;

/// Save state version for compatibility checking
///
/// Incremented whenever the encoding changes incompatibly.
pub const SAVE_STATE_VERSION: u32 = 1;

/// Complete save state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SaveStateMetadata,

    pub geometry: GeometryState,

    pub interrupts: InterruptState,
}

/// Save state metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStateMetadata {
    /// When the state was captured
    pub timestamp: DateTime<Utc>,

    /// Swapped frames at capture time
    pub frame_count: u64,
}

impl SaveState {
    /// Build a save state from component snapshots
    pub fn new(geometry: GeometryState, interrupts: InterruptState) -> Self {
        Self {
            version: SAVE_STATE_VERSION,
            metadata: SaveStateMetadata {
                timestamp: Utc::now(),
                frame_count: geometry.render.frame,
            },
            geometry,
            interrupts,
        }
    }

    /// Capture the current state of a system
    pub fn from_system(system: &System) -> Self {
        Self::new(
            StateSave::to_state(system.gx()),
            StateSave::to_state(system.interrupt_controller()),
        )
    }

    /// Encode to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::SaveState(format!("Failed to encode save state: {}", e)))
    }

    /// Decode from bytes, checking the version first
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config = config::standard();

        let (version, _): (u32, usize) = bincode::serde::decode_from_slice(bytes, config)
            .map_err(|e| EmulatorError::SaveState(format!("Failed to read save state header: {}", e)))?;
        if version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveState(format!(
                "Incompatible save state version: expected {}, got {}",
                SAVE_STATE_VERSION, version
            )));
        }

        let (state, _): (SaveState, usize) = bincode::serde::decode_from_slice(bytes, config)
            .map_err(|e| EmulatorError::SaveState(format!("Failed to decode save state: {}", e)))?;
        Ok(state)
    }

    /// Save state to file
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails or the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        std::fs::write(path.as_ref(), encoded)?;
        log::info!("Save state written to {}", path.as_ref().display());
        Ok(())
    }

    /// Load state from file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, decoding fails or the
    /// version is incompatible.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buffer = std::fs::read(path.as_ref())?;
        Self::from_bytes(&buffer)
    }
}

/// Components that can be saved and restored
pub trait StateSave {
    /// Serializable state for this component
    type State: Serialize + DeserializeOwned;

    /// Capture the component state
    fn to_state(&self) -> Self::State;

    /// Restore the component from a captured state
    fn restore_from_state(&mut self, state: &Self::State) -> Result<()>;
}

impl StateSave for GeometryEngine {
    type State = GeometryState;

    fn to_state(&self) -> GeometryState {
        GeometryEngine::to_state(self)
    }

    fn restore_from_state(&mut self, state: &GeometryState) -> Result<()> {
        GeometryEngine::restore_from_state(self, state)
    }
}

impl StateSave for InterruptController {
    type State = InterruptState;

    fn to_state(&self) -> InterruptState {
        InterruptController::to_state(self)
    }

    fn restore_from_state(&mut self, state: &InterruptState) -> Result<()> {
        InterruptController::restore_from_state(self, state);
        Ok(())
    }
}
