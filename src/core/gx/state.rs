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

//! Geometry engine snapshot

use serde::{Deserialize, Serialize};

use super::fifo::{Entry, FIFO_CAPACITY, PIPE_CAPACITY};
use super::lighting::Lighting;
use super::matrix::{Matrix, Vector4};
use super::matrix_ops::{MatrixMode, Viewport};
use super::registers::{FifoIrqMode, RenderControl};
use super::stack::{MatrixStack, MatrixStackState};
use super::swap::RenderBuffers;
use super::vertex::{Polygon, PolygonType, TextureAttributes, Vertex};
use super::{
    GeometryEngine, MODELVIEW_STACK_DEPTH, PROJECTION_STACK_DEPTH, TEXTURE_STACK_DEPTH,
};
use crate::core::error::{EmulatorError, Result};

/// Serializable geometry engine state
///
/// The busy latch is not part of the snapshot: a restored engine starts
/// idle and resumes dispatch through [`GeometryEngine::resume`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryState {
    pub fifo: Vec<Entry>,
    pub pipe: Vec<Entry>,
    pub gxfifo: u32,
    pub gxfifo_write_count: usize,

    pub matrix_mode: MatrixMode,
    pub projection: MatrixStackState,
    pub modelview: MatrixStackState,
    pub direction: MatrixStackState,
    pub texture_matrix: MatrixStackState,
    pub clip: Matrix,

    pub polygon_type: PolygonType,
    pub vertex_count: usize,
    pub current_vertex: Vertex,
    pub vertex_ram: Vec<Vertex>,
    pub polygon_ram: Vec<Polygon>,
    pub texture: TextureAttributes,
    pub pending_polygon_attributes: u32,
    pub polygon_attributes: u32,
    pub lighting: Lighting,
    pub viewport: Viewport,
    pub render: RenderBuffers,

    pub position_result: Vector4,
    pub vector_result: [i16; 3],
    pub control: RenderControl,
    pub irq_mode: FifoIrqMode,
    pub irq_pending: bool,
}

impl GeometryEngine {
    /// Capture the engine state
    pub fn to_state(&self) -> GeometryState {
        GeometryState {
            fifo: self.queue.fifo.iter().copied().collect(),
            pipe: self.queue.pipe.iter().copied().collect(),
            gxfifo: self.queue.gxfifo,
            gxfifo_write_count: self.queue.gxfifo_write_count,

            matrix_mode: self.matrix_mode,
            projection: self.projection.to_state(),
            modelview: self.modelview.to_state(),
            direction: self.direction.to_state(),
            texture_matrix: self.texture_matrix.to_state(),
            clip: self.clip,

            polygon_type: self.polygon_type,
            vertex_count: self.vertex_count,
            current_vertex: self.current_vertex,
            vertex_ram: self.vertex_ram.clone(),
            polygon_ram: self.polygon_ram.clone(),
            texture: self.texture,
            pending_polygon_attributes: self.pending_polygon_attributes,
            polygon_attributes: self.polygon_attributes,
            lighting: self.lighting.clone(),
            viewport: self.viewport,
            render: self.render.clone(),

            position_result: self.position_result,
            vector_result: self.vector_result,
            control: self.control.clone(),
            irq_mode: self.irq_mode,
            irq_pending: self.irq_pending,
        }
    }

    /// Restore the engine from a snapshot
    ///
    /// Configuration and the registered event handle are kept. The snapshot
    /// is validated up front; on error the engine is left untouched.
    pub fn restore_from_state(&mut self, state: &GeometryState) -> Result<()> {
        Self::validate_state(state)?;

        self.projection.restore_from_state(&state.projection);
        self.modelview.restore_from_state(&state.modelview);
        self.direction.restore_from_state(&state.direction);
        self.texture_matrix.restore_from_state(&state.texture_matrix);

        self.queue.fifo = state.fifo.iter().copied().collect();
        self.queue.pipe = state.pipe.iter().copied().collect();
        self.queue.gxfifo = state.gxfifo;
        self.queue.gxfifo_write_count = state.gxfifo_write_count;
        self.busy = false;

        self.matrix_mode = state.matrix_mode;
        self.clip = state.clip;

        self.polygon_type = state.polygon_type;
        self.vertex_count = state.vertex_count;
        self.current_vertex = state.current_vertex;
        self.vertex_ram = state.vertex_ram.clone();
        self.polygon_ram = state.polygon_ram.clone();
        self.texture = state.texture;
        self.pending_polygon_attributes = state.pending_polygon_attributes;
        self.polygon_attributes = state.polygon_attributes;
        self.lighting = state.lighting.clone();
        self.viewport = state.viewport;
        self.render = state.render.clone();

        self.position_result = state.position_result;
        self.vector_result = state.vector_result;
        self.control = state.control.clone();
        self.irq_mode = state.irq_mode;
        self.irq_pending = state.irq_pending;

        self.vertex_overflow = false;
        self.polygon_overflow = false;

        Ok(())
    }

    fn validate_state(state: &GeometryState) -> Result<()> {
        let stacks_ok = MatrixStack::<PROJECTION_STACK_DEPTH>::accepts(&state.projection)
            && MatrixStack::<MODELVIEW_STACK_DEPTH>::accepts(&state.modelview)
            && MatrixStack::<MODELVIEW_STACK_DEPTH>::accepts(&state.direction)
            && MatrixStack::<TEXTURE_STACK_DEPTH>::accepts(&state.texture_matrix);
        if !stacks_ok {
            return Err(EmulatorError::SaveState(
                "matrix stack depth mismatch".to_string(),
            ));
        }

        if state.fifo.len() > FIFO_CAPACITY || state.pipe.len() > PIPE_CAPACITY {
            return Err(EmulatorError::SaveState(format!(
                "command queue overflow (fifo {}, pipe {})",
                state.fifo.len(),
                state.pipe.len()
            )));
        }

        Ok(())
    }
}
