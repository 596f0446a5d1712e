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

//! Geometry engine tests
//!
//! Tests are organized into the following modules:
//! - `matrix`: Fixed-point matrix math
//! - `stack`: Matrix stack push/pop/store/restore and error flag
//! - `fifo`: Command queue, pipe refill and packed GXFIFO writes
//! - `dispatch`: Parameter gating, busy event and forced drain
//! - `matrix_ops`: MTX_* commands and the clip matrix
//! - `vertex`: Vertex submission and polygon topologies
//! - `swap`: SWAP_BUFFERS and snapshots
//! - `registers`: GXSTAT, RAM_COUNT, result and control registers

mod fifo;
mod registers;
mod stack;

use super::{regs, GeometryEngine};
use crate::core::timing::{TickCount, TimingEventManager};

/// Engine with its command event registered
pub(super) fn setup() -> (GeometryEngine, TimingEventManager) {
    let mut timing = TimingEventManager::new();
    let mut gx = GeometryEngine::new();
    gx.register_events(&mut timing);
    (gx, timing)
}

/// Engine without a command event: complete commands run back to back
pub(super) fn unscheduled() -> (GeometryEngine, TimingEventManager) {
    (GeometryEngine::new(), TimingEventManager::new())
}

/// Send a command through its direct port
///
/// Commands without parameters still take one (ignored) write.
pub(super) fn send(
    gx: &mut GeometryEngine,
    timing: &mut TimingEventManager,
    command: u8,
    params: &[u32],
) {
    let port = regs::command_port(command);
    if params.is_empty() {
        gx.write32(timing, port, 0).unwrap();
    }
    for &param in params {
        gx.write32(timing, port, param).unwrap();
    }
}

/// Advance the scheduler and deliver fired events
pub(super) fn tick(gx: &mut GeometryEngine, timing: &mut TimingEventManager, ticks: TickCount) {
    timing.pending_ticks += ticks;
    let triggered = timing.run_events();
    gx.process_events(timing, &triggered).unwrap();
}

/// Tick until the engine stops being busy
pub(super) fn settle(gx: &mut GeometryEngine, timing: &mut TimingEventManager) {
    for _ in 0..100_000 {
        if !gx.is_busy() {
            return;
        }
        tick(gx, timing, 1);
    }
    panic!("geometry engine never settled");
}

/// Integer to 20.12 fixed point, as a parameter word
pub(super) fn fx(value: i32) -> u32 {
    (value << 12) as u32
}

/// VTX_16 parameters for raw 4.12 coordinates
pub(super) fn vtx16(x: i16, y: i16, z: i16) -> [u32; 2] {
    [(x as u16 as u32) | ((y as u16 as u32) << 16), z as u16 as u32]
}
