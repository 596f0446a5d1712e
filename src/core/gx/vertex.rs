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

//! Vertex and polygon assembly
//!
//! Vertex commands update the current (object-space) vertex and submit it.
//! A submitted vertex is transformed by the clip matrix, mapped to the
//! 256x192 screen and appended to vertex RAM. Polygons are formed from the
//! most recent vertices according to the active [`PolygonType`].
//!
//! # Vertex encodings
//!
//! | Command  | Parameters | Format                                  |
//! |----------|------------|-----------------------------------------|
//! | VTX_16   | 2          | x, y, z as s16 (4.12)                   |
//! | VTX_10   | 1          | x, y, z as 10-bit (4.6)                 |
//! | VTX_XY   | 1          | x, y as s16, z unchanged                |
//! | VTX_XZ   | 1          | x, z as s16, y unchanged                |
//! | VTX_YZ   | 1          | y, z as s16, x unchanged                |
//! | VTX_DIFF | 1          | three 10-bit deltas added to the vertex |

use serde::{Deserialize, Serialize};

use super::command::{split_i16, unpack_10bit};
use super::matrix::{multiply_vertex, ONE};
use super::GeometryEngine;
use crate::core::error::{GeometryError, Result};

/// Vertex RAM capacity (per frame)
pub const MAX_VERTICES: usize = 6144;

/// Polygon RAM capacity (per frame)
pub const MAX_POLYGONS: usize = 2048;

/// Screen-space vertex
///
/// After submission `x` and `y` are screen coordinates, `z` and `w` are the
/// clip-space values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
    /// 15-bit RGB
    pub colour: u16,
    /// Texture coordinates (12.4)
    pub s: i16,
    pub t: i16,
}

/// Primitive topology selected by BEGIN_VTXS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolygonType {
    #[default]
    Triangle = 0,
    Quad = 1,
    TriangleStrip = 2,
    QuadStrip = 3,
}

impl PolygonType {
    pub fn from_bits(value: u32) -> Self {
        match value & 0x3 {
            0 => Self::Triangle,
            1 => Self::Quad,
            2 => Self::TriangleStrip,
            _ => Self::QuadStrip,
        }
    }

    /// Vertices per polygon (3 or 4)
    pub fn vertices_per_polygon(self) -> usize {
        3 + (self as usize & 0x1)
    }

    /// Whether the vertex that brings the run to `count` completes a polygon
    pub fn completes_polygon(self, count: usize) -> bool {
        match self {
            Self::Triangle => count % 3 == 0,
            Self::Quad => count % 4 == 0,
            Self::TriangleStrip => count >= 3,
            Self::QuadStrip => count >= 4 && count % 2 == 0,
        }
    }
}

/// Texture state snapshotted into each polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextureAttributes {
    /// TEXIMAGE_PARAM
    pub image_param: u32,
    /// PLTT_BASE
    pub palette_base: u32,
}

impl TextureAttributes {
    /// Texture coordinate transformation mode (TEXIMAGE_PARAM bits 30-31)
    pub fn transform_mode(&self) -> u8 {
        (self.image_param >> 30) as u8
    }
}

/// Polygon referencing a run of vertices in vertex RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Index of the first vertex
    pub vertex_start: usize,
    /// Vertex count (3 or 4)
    pub size: usize,
    pub texture: TextureAttributes,
    pub polygon_attributes: u32,
}

impl Polygon {
    /// Vertex index range
    pub fn vertex_range(&self) -> std::ops::Range<usize> {
        self.vertex_start..self.vertex_start + self.size
    }
}

/// Map a clip-space vertex to 256x192 screen coordinates
///
/// A vertex with `w == 0` passes through unchanged.
pub fn normalize(v: Vertex) -> Vertex {
    if v.w == 0 {
        return v;
    }

    let w = v.w as i64;
    Vertex {
        x: ((v.x as i64 * 128) / w + 128) as i32,
        y: ((-(v.y as i64) * 96) / w + 96) as i32,
        ..v
    }
}

impl GeometryEngine {
    /// COLOR (0x20)
    pub(in crate::core::gx) fn set_vertex_colour(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.current_vertex.colour = (parameter & 0x7FFF) as u16;
    }

    /// TEXCOORD (0x22)
    ///
    /// Mode 1 applies the texture matrix; modes 2 and 3 (normal and vertex
    /// sources) are not supported and pass the coordinates through.
    pub(in crate::core::gx) fn set_texture_coordinates(&mut self) -> Result<()> {
        let parameter = self.dequeue_entry().parameter;
        let (s, t) = split_i16(parameter);

        match self.texture.transform_mode() {
            0 => {
                self.current_vertex.s = s;
                self.current_vertex.t = t;
            }
            1 => {
                let m = &self.texture_matrix.current.field;
                let (s, t) = (s as i64, t as i64);
                let transform = |col: usize| {
                    ((s * m[0][col] as i64 + t * m[1][col] as i64 + m[2][col] as i64 + m[3][col] as i64)
                        >> 12) as i16
                };
                self.current_vertex.s = transform(0);
                self.current_vertex.t = transform(1);
            }
            mode => {
                self.current_vertex.s = s;
                self.current_vertex.t = t;
                if self.strict_commands {
                    return Err(GeometryError::UnsupportedTextureTransform { mode }.into());
                }
                log::warn!("GX: texture coordinate transform mode {} not supported", mode);
            }
        }

        Ok(())
    }

    /// VTX_16 (0x23)
    pub(in crate::core::gx) fn add_vertex_16(&mut self) {
        let [xy, z] = self.dequeue_parameters::<2>();
        let (x, y) = split_i16(xy);

        self.current_vertex.x = x as i32;
        self.current_vertex.y = y as i32;
        self.current_vertex.z = z as i16 as i32;
        self.add_vertex();
    }

    /// VTX_10 (0x24)
    ///
    /// 4.6 components are widened to 4.12.
    pub(in crate::core::gx) fn add_vertex_10(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        let [x, y, z] = unpack_10bit(parameter);

        self.current_vertex.x = x << 6;
        self.current_vertex.y = y << 6;
        self.current_vertex.z = z << 6;
        self.add_vertex();
    }

    /// VTX_XY (0x25)
    pub(in crate::core::gx) fn set_vertex_xy(&mut self) {
        let (x, y) = split_i16(self.dequeue_entry().parameter);
        self.current_vertex.x = x as i32;
        self.current_vertex.y = y as i32;
        self.add_vertex();
    }

    /// VTX_XZ (0x26)
    pub(in crate::core::gx) fn set_vertex_xz(&mut self) {
        let (x, z) = split_i16(self.dequeue_entry().parameter);
        self.current_vertex.x = x as i32;
        self.current_vertex.z = z as i32;
        self.add_vertex();
    }

    /// VTX_YZ (0x27)
    pub(in crate::core::gx) fn set_vertex_yz(&mut self) {
        let (y, z) = split_i16(self.dequeue_entry().parameter);
        self.current_vertex.y = y as i32;
        self.current_vertex.z = z as i32;
        self.add_vertex();
    }

    /// VTX_DIFF (0x28)
    // TODO: the `/ 8 >> 3` scaling divides by 64 overall; check against
    // hardware captures before changing it.
    pub(in crate::core::gx) fn set_relative_vertex(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        let [dx, dy, dz] = unpack_10bit(parameter).map(|d| (d / 8) >> 3);

        self.current_vertex.x += dx;
        self.current_vertex.y += dy;
        self.current_vertex.z += dz;
        self.add_vertex();
    }

    /// POLYGON_ATTR (0x29)
    ///
    /// Takes effect at the next BEGIN_VTXS.
    pub(in crate::core::gx) fn set_polygon_attributes(&mut self) {
        self.pending_polygon_attributes = self.dequeue_entry().parameter;
    }

    /// BEGIN_VTXS (0x40)
    pub(in crate::core::gx) fn begin_vertex_list(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        self.polygon_type = PolygonType::from_bits(parameter);
        self.vertex_count = 0;
        self.polygon_attributes = self.pending_polygon_attributes;
        log::debug!("GX: begin vertex list ({:?})", self.polygon_type);
    }

    /// END_VTXS (0x41)
    pub(in crate::core::gx) fn end_vertex_list(&mut self) {
        self.dequeue_entry();
    }

    /// Transform the current vertex and append it to vertex RAM
    pub(in crate::core::gx) fn add_vertex(&mut self) {
        if self.vertex_ram.len() >= MAX_VERTICES {
            if !self.vertex_overflow {
                log::warn!("GX: vertex RAM full, dropping vertices this frame");
                self.vertex_overflow = true;
            }
            return;
        }

        self.current_vertex.w = ONE;
        let v = self.current_vertex;
        let [x, y, z, w] = multiply_vertex(&[v.x, v.y, v.z, v.w], &self.clip);

        self.vertex_ram.push(normalize(Vertex { x, y, z, w, ..v }));
        self.vertex_count += 1;

        if self.polygon_type.completes_polygon(self.vertex_count) {
            self.add_polygon();
        }
    }

    /// Record a polygon over the most recent vertices
    pub(in crate::core::gx) fn add_polygon(&mut self) {
        if self.polygon_ram.len() >= MAX_POLYGONS {
            if !self.polygon_overflow {
                log::warn!("GX: polygon RAM full, dropping polygons this frame");
                self.polygon_overflow = true;
            }
            return;
        }

        let size = self.polygon_type.vertices_per_polygon();
        let Some(vertex_start) = self.vertex_ram.len().checked_sub(size) else {
            return;
        };

        self.polygon_ram.push(Polygon {
            vertex_start,
            size,
            texture: self.texture,
            polygon_attributes: self.polygon_attributes,
        });
    }
}
