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

//! Buffer swap
//!
//! SWAP_BUFFERS hands the frame's vertex and polygon RAM to the renderer
//! side and starts a fresh building buffer. Swapping happens inside command
//! dispatch, so a reader never sees a half-built frame.

use serde::{Deserialize, Serialize};

use super::vertex::{Polygon, Vertex, MAX_POLYGONS, MAX_VERTICES};
use super::GeometryEngine;

/// Geometry of the last completed frame
///
/// This is the only engine state a rasterizer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderBuffers {
    pub vertices: Vec<Vertex>,
    pub polygons: Vec<Polygon>,
    /// SWAP_BUFFERS bit 0
    pub manual_translucent_sort: bool,
    /// SWAP_BUFFERS bit 1
    pub w_buffering: bool,
    /// Number of swaps since reset
    pub frame: u64,
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_VERTICES),
            polygons: Vec::with_capacity(MAX_POLYGONS),
            manual_translucent_sort: false,
            w_buffering: false,
            frame: 0,
        }
    }

    /// Vertices of `polygon`
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::gx::RenderBuffers;
    ///
    /// let buffers = RenderBuffers::new();
    /// assert!(buffers.polygons.is_empty());
    /// ```
    pub fn polygon_vertices(&self, polygon: &Polygon) -> &[Vertex] {
        self.vertices.get(polygon.vertex_range()).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.polygons.clear();
        self.manual_translucent_sort = false;
        self.w_buffering = false;
        self.frame = 0;
    }
}

impl Default for RenderBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryEngine {
    /// SWAP_BUFFERS (0x50)
    pub(in crate::core::gx) fn swap_buffers(&mut self) {
        let parameter = self.dequeue_entry().parameter;

        std::mem::swap(&mut self.vertex_ram, &mut self.render.vertices);
        std::mem::swap(&mut self.polygon_ram, &mut self.render.polygons);
        self.vertex_ram.clear();
        self.polygon_ram.clear();
        self.vertex_count = 0;

        self.render.manual_translucent_sort = parameter & 0x1 != 0;
        self.render.w_buffering = parameter & 0x2 != 0;
        self.render.frame += 1;

        self.vertex_overflow = false;
        self.polygon_overflow = false;

        log::debug!(
            "GX: swap buffers (frame {}, {} polygons, {} vertices)",
            self.render.frame,
            self.render.polygons.len(),
            self.render.vertices.len()
        );
    }
}
