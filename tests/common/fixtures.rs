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

//! Test fixtures for common test scenarios

use dsrx::core::gx::{opcodes, regs};
use dsrx::core::{Config, GeometryConfig, Script, System};

/// Create a System with a given command latency
#[allow(dead_code)]
pub fn create_test_system(command_latency: i32) -> System {
    System::with_config(Config {
        geometry: GeometryConfig {
            command_latency,
            ..GeometryConfig::default()
        },
    })
}

/// VTX_16 parameter words
#[allow(dead_code)]
pub fn vtx16(x: i16, y: i16, z: i16) -> [u32; 2] {
    [(x as u16 as u32) | ((y as u16 as u32) << 16), z as u16 as u32]
}

/// Append a command with its parameters on the direct port
#[allow(dead_code)]
pub fn command(script: Script, opcode: u8, params: &[u32]) -> Script {
    let port = regs::command_port(opcode);
    if params.is_empty() {
        return script.write32(port, 0);
    }
    params
        .iter()
        .fold(script, |script, &param| script.write32(port, param))
}

/// Script for one triangle list primitive with the given vertices
#[allow(dead_code)]
pub fn triangle_script(vertices: &[(i16, i16, i16)]) -> Script {
    let mut script = command(Script::new(), opcodes::BEGIN_VTXS, &[0]);
    for &(x, y, z) in vertices {
        script = command(script, opcodes::VTX_16, &vtx16(x, y, z));
    }
    command(script, opcodes::END_VTXS, &[])
}
