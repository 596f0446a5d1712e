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

//! Box, position and vector test commands

use super::command::{split_i16, unpack_10bit};
use super::matrix::{multiply_direction, multiply_vertex, ONE};
use super::GeometryEngine;

impl GeometryEngine {
    /// BOX_TEST (0x70)
    ///
    /// Parameters are consumed; the frustum test result is not computed.
    pub(in crate::core::gx) fn box_test(&mut self) {
        let params: [u32; 3] = self.dequeue_parameters();
        log::trace!(
            "GX: BOX_TEST {:08X} {:08X} {:08X} ignored",
            params[0],
            params[1],
            params[2]
        );
    }

    /// POS_TEST (0x71)
    ///
    /// Transforms (x, y, z, 1.0) by the clip matrix into POS_RESULT. The
    /// coordinates also become the current vertex position.
    pub(in crate::core::gx) fn position_test(&mut self) {
        let [xy, z] = self.dequeue_parameters::<2>();
        let (x, y) = split_i16(xy);

        self.current_vertex.x = x as i32;
        self.current_vertex.y = y as i32;
        self.current_vertex.z = z as i16 as i32;

        let v = self.current_vertex;
        self.position_result = multiply_vertex(&[v.x, v.y, v.z, ONE], &self.clip);
    }

    /// VEC_TEST (0x72)
    ///
    /// Transforms a 1.9 direction by the direction matrix into VEC_RESULT.
    pub(in crate::core::gx) fn vector_test(&mut self) {
        let parameter = self.dequeue_entry().parameter;
        let direction = unpack_10bit(parameter).map(|c| c << 3);

        self.vector_result =
            multiply_direction(&direction, &self.direction.current).map(|c| c as i16);
    }
}
