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

//! Matrix pipeline commands
//!
//! MTX_* commands act on the matrix (or matrices) selected by the current
//! matrix mode. Changes to projection or modelview recompute the clip
//! matrix.

use serde::{Deserialize, Serialize};

use super::command::sign_extend;
use super::matrix::{multiply, Matrix};
use super::GeometryEngine;

/// Target of matrix commands (MTX_MODE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatrixMode {
    #[default]
    Projection = 0,
    /// Position matrix only
    Modelview = 1,
    /// Position and direction matrices together
    Simultaneous = 2,
    Texture = 3,
}

impl MatrixMode {
    pub fn from_bits(value: u32) -> Self {
        match value & 0x3 {
            0 => Self::Projection,
            1 => Self::Modelview,
            2 => Self::Simultaneous,
            _ => Self::Texture,
        }
    }
}

/// VIEWPORT rectangle, one byte per coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub x1: u8,
    pub y1: u8,
    pub x2: u8,
    pub y2: u8,
}

impl Viewport {
    pub fn from_u32(value: u32) -> Self {
        Self {
            x1: value as u8,
            y1: (value >> 8) as u8,
            x2: (value >> 16) as u8,
            y2: (value >> 24) as u8,
        }
    }
}

impl GeometryEngine {
    /// Recompute clip = modelview * projection
    pub(in crate::core::gx) fn update_clip_matrix(&mut self) {
        self.clip = multiply(&self.modelview.current, &self.projection.current);
    }

    /// Apply `f` to the current matrix (or matrices) selected by the mode
    ///
    /// In simultaneous mode the direction matrix is only touched when
    /// `include_direction` is set.
    fn apply_to_current<F>(&mut self, include_direction: bool, f: F)
    where
        F: Fn(&Matrix) -> Matrix,
    {
        match self.matrix_mode {
            MatrixMode::Projection => {
                self.projection.current = f(&self.projection.current);
                self.update_clip_matrix();
            }
            MatrixMode::Modelview => {
                self.modelview.current = f(&self.modelview.current);
                self.update_clip_matrix();
            }
            MatrixMode::Simultaneous => {
                self.modelview.current = f(&self.modelview.current);
                if include_direction {
                    self.direction.current = f(&self.direction.current);
                }
                self.update_clip_matrix();
            }
            MatrixMode::Texture => {
                self.texture_matrix.current = f(&self.texture_matrix.current);
            }
        }
    }

    fn load_current(&mut self, matrix: Matrix) {
        self.apply_to_current(true, |_| matrix);
    }

    fn multiply_current(&mut self, temp: Matrix, include_direction: bool) {
        self.apply_to_current(include_direction, |current| multiply(&temp, current));
    }

    /// MTX_MODE (0x10)
    pub(in crate::core::gx) fn set_matrix_mode(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.matrix_mode = MatrixMode::from_bits(parameter);
        log::debug!("GX: matrix mode {:?}", self.matrix_mode);
    }

    /// MTX_PUSH (0x11)
    pub(in crate::core::gx) fn push_current_matrix(&mut self) {
        self.dequeue_entry();

        match self.matrix_mode {
            MatrixMode::Projection => {
                self.projection.push();
                self.update_clip_matrix();
            }
            MatrixMode::Modelview | MatrixMode::Simultaneous => {
                self.modelview.push();
                self.direction.push();
                self.update_clip_matrix();
            }
            MatrixMode::Texture => self.texture_matrix.push(),
        }
    }

    /// MTX_POP (0x12)
    ///
    /// The offset is a signed 6-bit field.
    pub(in crate::core::gx) fn pop_current_matrix(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        let offset = sign_extend(parameter & 0x3F, 6);

        match self.matrix_mode {
            MatrixMode::Projection => {
                self.projection.pop(offset);
                self.update_clip_matrix();
            }
            MatrixMode::Modelview | MatrixMode::Simultaneous => {
                self.modelview.pop(offset);
                self.direction.pop(offset);
                self.update_clip_matrix();
            }
            MatrixMode::Texture => self.texture_matrix.pop(offset),
        }
    }

    /// MTX_STORE (0x13)
    pub(in crate::core::gx) fn store_current_matrix(&mut self) {
        let offset = (self.dequeue_entry().parameter & 0x1F) as usize;

        match self.matrix_mode {
            MatrixMode::Projection => self.projection.store(offset),
            MatrixMode::Modelview | MatrixMode::Simultaneous => {
                self.modelview.store(offset);
                self.direction.store(offset);
            }
            MatrixMode::Texture => self.texture_matrix.store(offset),
        }
    }

    /// MTX_RESTORE (0x14)
    pub(in crate::core::gx) fn restore_current_matrix(&mut self) {
        let offset = (self.dequeue_entry().parameter & 0x1F) as usize;

        match self.matrix_mode {
            MatrixMode::Projection => {
                self.projection.restore(offset);
                self.update_clip_matrix();
            }
            MatrixMode::Modelview | MatrixMode::Simultaneous => {
                self.modelview.restore(offset);
                self.direction.restore(offset);
                self.update_clip_matrix();
            }
            MatrixMode::Texture => self.texture_matrix.restore(offset),
        }
    }

    /// MTX_IDENTITY (0x15)
    pub(in crate::core::gx) fn load_unit_matrix(&mut self) {
        self.dequeue_entry();
        self.load_current(Matrix::identity());
    }

    /// MTX_LOAD_4x4 (0x16)
    pub(in crate::core::gx) fn load_4x4(&mut self) {
        let params: [u32; 16] = self.dequeue_parameters();
        self.load_current(Matrix::from_4x4(&params));
    }

    /// MTX_LOAD_4x3 (0x17)
    pub(in crate::core::gx) fn load_4x3(&mut self) {
        let params: [u32; 12] = self.dequeue_parameters();
        self.load_current(Matrix::from_4x3(&params));
    }

    /// MTX_MULT_4x4 (0x18)
    pub(in crate::core::gx) fn multiply_4x4(&mut self) {
        let params: [u32; 16] = self.dequeue_parameters();
        self.multiply_current(Matrix::from_4x4(&params), true);
    }

    /// MTX_MULT_4x3 (0x19)
    pub(in crate::core::gx) fn multiply_4x3(&mut self) {
        let params: [u32; 12] = self.dequeue_parameters();
        self.multiply_current(Matrix::from_4x3(&params), true);
    }

    /// MTX_MULT_3x3 (0x1A)
    pub(in crate::core::gx) fn multiply_3x3(&mut self) {
        let params: [u32; 9] = self.dequeue_parameters();
        self.multiply_current(Matrix::from_3x3(&params), true);
    }

    /// MTX_SCALE (0x1B)
    ///
    /// Never applied to the direction matrix, even in simultaneous mode.
    pub(in crate::core::gx) fn multiply_scale(&mut self) {
        let params: [u32; 3] = self.dequeue_parameters();
        self.multiply_current(Matrix::scale(&params), false);
    }

    /// MTX_TRANS (0x1C)
    pub(in crate::core::gx) fn multiply_translation(&mut self) {
        let params: [u32; 3] = self.dequeue_parameters();
        self.multiply_current(Matrix::translation(&params), true);
    }

    /// VIEWPORT (0x60)
    pub(in crate::core::gx) fn set_viewport(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.viewport = Viewport::from_u32(parameter);
    }

    /// TEXIMAGE_PARAM (0x2A)
    pub(in crate::core::gx) fn set_texture_parameters(&mut self) {
        self.texture.image_param = self.dequeue_entry().parameter;
    }

    /// PLTT_BASE (0x2B)
    pub(in crate::core::gx) fn set_texture_palette_address(&mut self) {
        self.texture.palette_base = self.dequeue_entry().parameter & 0x1FFF;
    }
}
