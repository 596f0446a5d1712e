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

//! Custom assertions for geometry engine testing

use dsrx::core::gx::Polygon;
use dsrx::core::System;

/// Assert a register reads back the expected value
#[allow(dead_code)]
pub fn assert_register(system: &System, addr: u32, expected: u32) {
    let actual = system.read32(addr).expect("Failed to read register");
    assert_eq!(
        actual, expected,
        "Register at 0x{:08X} mismatch: expected 0x{:08X}, got 0x{:08X}",
        addr, expected, actual
    );
}

/// Assert the screen positions of a published polygon
#[allow(dead_code)]
pub fn assert_polygon_screen(system: &System, polygon: &Polygon, expected: &[(i32, i32)]) {
    let render = system.gx().render_buffers();
    let actual: Vec<(i32, i32)> = render
        .polygon_vertices(polygon)
        .iter()
        .map(|v| (v.x, v.y))
        .collect();
    assert_eq!(actual, expected, "Polygon screen positions mismatch");
}
