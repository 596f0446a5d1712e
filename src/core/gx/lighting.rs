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

//! Lighting command state
//!
//! Lighting parameters are latched as written. Light evaluation itself is
//! not performed; a rasterizer or a later lighting stage reads them from
//! [`Lighting`].

use serde::{Deserialize, Serialize};

use super::command::unpack_10bit;
use super::GeometryEngine;

/// Number of hardware lights
pub const LIGHT_COUNT: usize = 4;

/// Latched lighting parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lighting {
    /// Last NORMAL, three signed 1.9 components
    pub normal: [i32; 3],
    /// DIF_AMB
    pub diffuse_ambient: u32,
    /// SPE_EMI
    pub specular_emission: u32,
    /// LIGHT_VECTOR per light (raw parameter)
    pub light_vectors: [u32; LIGHT_COUNT],
    /// LIGHT_COLOR per light (raw parameter)
    pub light_colours: [u32; LIGHT_COUNT],
    /// SHININESS table, 32 words of 4 packed bytes
    pub shininess: [u32; 32],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            normal: [0; 3],
            diffuse_ambient: 0,
            specular_emission: 0,
            light_vectors: [0; LIGHT_COUNT],
            light_colours: [0; LIGHT_COUNT],
            shininess: [0; 32],
        }
    }
}

impl GeometryEngine {
    /// NORMAL (0x21)
    pub(in crate::core::gx) fn set_normal_vector(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.lighting.normal = unpack_10bit(parameter);
    }

    /// DIF_AMB (0x30)
    ///
    /// Bit 15 also makes the diffuse colour the current vertex colour.
    pub(in crate::core::gx) fn set_diffuse_ambient_reflect(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.lighting.diffuse_ambient = parameter;

        if parameter & (1 << 15) != 0 {
            self.current_vertex.colour = (parameter & 0x7FFF) as u16;
        }
    }

    /// SPE_EMI (0x31)
    pub(in crate::core::gx) fn set_specular_reflect_emission(&mut self) {
        self.lighting.specular_emission = self.dequeue_entry().parameter;
    }

    /// LIGHT_VECTOR (0x32), light number in bits 30-31
    pub(in crate::core::gx) fn set_light_vector(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.lighting.light_vectors[(parameter >> 30) as usize] = parameter;
    }

    /// LIGHT_COLOR (0x33), light number in bits 30-31
    pub(in crate::core::gx) fn set_light_colour(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.lighting.light_colours[(parameter >> 30) as usize] = parameter;
    }

    /// SHININESS (0x34)
    pub(in crate::core::gx) fn set_shininess(&mut self) {
        self.lighting.shininess = self.dequeue_parameters();
    }
}
