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

//! Command dispatcher
//!
//! Runs the command at the head of the pipe once all of its parameters are
//! queued, then holds the engine busy until the "GeometryCommand" event
//! fires. The busy gate is a small state machine:
//!
//! ```text
//!   Idle ──dispatch──► Busy ──event fires──► Idle ──► run_command()
//! ```

use super::command::{self, opcodes::*};
use super::GeometryEngine;
use crate::core::error::{GeometryError, Result};
use crate::core::timing::Scheduler;

impl GeometryEngine {
    /// Try to execute the command at the head of the queue
    ///
    /// Does nothing while busy, while the queue is empty, or while the head
    /// command is still waiting for parameters. After a dispatch the engine
    /// stays busy until the command event fires. Without a registered event
    /// commands run back to back.
    pub fn run_command(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        loop {
            if self.busy || self.queue.is_empty() {
                return Ok(());
            }

            let Some(command) = self.queue.peek_command() else {
                return Ok(());
            };

            if self.queue.len() < command::entry_count(command) {
                return Ok(());
            }

            self.execute(command)?;

            if let Some(handle) = self.command_event {
                self.busy = true;
                scheduler.schedule(handle, self.command_latency);
                return Ok(());
            }
        }
    }

    /// Force pending commands to run until the FIFO has room
    ///
    /// Cancels the pending busy event each round so the writer is never
    /// dropped.
    pub(in crate::core::gx) fn drain_full_fifo(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        log::debug!("GX: FIFO full, draining");

        while self.queue.is_fifo_full() {
            let before = self.queue.len();

            self.busy = false;
            if let Some(handle) = self.command_event {
                scheduler.deactivate(handle);
            }
            self.run_command(scheduler)?;

            if self.queue.len() == before {
                log::warn!("GX: FIFO drain made no progress");
                break;
            }
        }

        Ok(())
    }

    /// Execute one command, consuming exactly its entries
    pub(in crate::core::gx) fn execute(&mut self, command: u8) -> Result<()> {
        log::trace!("GX: execute {} ({:#04x})", command::name(command), command);

        match command {
            NOP => {
                self.dequeue_entry();
            }

            MTX_MODE => self.set_matrix_mode(),
            MTX_PUSH => self.push_current_matrix(),
            MTX_POP => self.pop_current_matrix(),
            MTX_STORE => self.store_current_matrix(),
            MTX_RESTORE => self.restore_current_matrix(),
            MTX_IDENTITY => self.load_unit_matrix(),
            MTX_LOAD_4X4 => self.load_4x4(),
            MTX_LOAD_4X3 => self.load_4x3(),
            MTX_MULT_4X4 => self.multiply_4x4(),
            MTX_MULT_4X3 => self.multiply_4x3(),
            MTX_MULT_3X3 => self.multiply_3x3(),
            MTX_SCALE => self.multiply_scale(),
            MTX_TRANS => self.multiply_translation(),

            COLOR => self.set_vertex_colour(),
            NORMAL => self.set_normal_vector(),
            TEXCOORD => self.set_texture_coordinates()?,
            VTX_16 => self.add_vertex_16(),
            VTX_10 => self.add_vertex_10(),
            VTX_XY => self.set_vertex_xy(),
            VTX_XZ => self.set_vertex_xz(),
            VTX_YZ => self.set_vertex_yz(),
            VTX_DIFF => self.set_relative_vertex(),
            POLYGON_ATTR => self.set_polygon_attributes(),
            TEXIMAGE_PARAM => self.set_texture_parameters(),
            PLTT_BASE => self.set_texture_palette_address(),

            DIF_AMB => self.set_diffuse_ambient_reflect(),
            SPE_EMI => self.set_specular_reflect_emission(),
            LIGHT_VECTOR => self.set_light_vector(),
            LIGHT_COLOR => self.set_light_colour(),
            SHININESS => self.set_shininess(),

            BEGIN_VTXS => self.begin_vertex_list(),
            END_VTXS => self.end_vertex_list(),

            SWAP_BUFFERS => self.swap_buffers(),
            VIEWPORT => self.set_viewport(),

            BOX_TEST => self.box_test(),
            POS_TEST => self.position_test(),
            VEC_TEST => self.vector_test(),

            _ => {
                if self.strict_commands {
                    return Err(GeometryError::UnknownCommand { command }.into());
                }
                log::warn!("GX: unknown command {:#04x} skipped", command);
                self.dequeue_entry();
            }
        }

        Ok(())
    }
}
