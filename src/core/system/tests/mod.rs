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

//! System module tests
//!
//! Tests are organized into the following modules:
//! - `basic`: Construction, configuration and reset
//! - `bus`: Register routing, alignment and unmapped addresses
//! - `execution`: Scheduler-driven command execution
//! - `interrupt_integration`: GXFIFO interrupt delivery to IF
//! - `script`: Register script replay
//! - `save_state`: Save and restore through the system


use super::System;
use crate::core::config::{Config, GeometryConfig};
use crate::core::gx::regs;

/// System with the given command latency
pub(super) fn with_latency(command_latency: i32) -> System {
    System::with_config(Config {
        geometry: GeometryConfig {
            command_latency,
            ..GeometryConfig::default()
        },
    })
}

/// Send a command through its direct port
pub(super) fn send(system: &mut System, command: u8, params: &[u32]) {
    let port = regs::command_port(command);
    if params.is_empty() {
        system.write32(port, 0).unwrap();
    }
    for &param in params {
        system.write32(port, param).unwrap();
    }
}

/// VTX_16 parameters
pub(super) fn vtx16(x: i16, y: i16, z: i16) -> [u32; 2] {
    [(x as u16 as u32) | ((y as u16 as u32) << 16), z as u16 as u32]
}

/// Queue one triangle with vertices at x = 0, 0.5 and 1.0
pub(super) fn send_triangle(system: &mut System) {
    use crate::core::gx::opcodes;

    send(system, opcodes::BEGIN_VTXS, &[0]);
    for x in [0, 0x800, 0x1000] {
        send(system, opcodes::VTX_16, &vtx16(x, 0, 0));
    }
    send(system, opcodes::END_VTXS, &[]);
}
