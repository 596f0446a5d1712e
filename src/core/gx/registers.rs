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

//! Geometry engine I/O registers
//!
//! ## Register map
//!
//! ```text
//! Address             | Name             | Access
//! --------------------|------------------|--------
//! 0x04000060          | DISP3DCNT        | R/W
//! 0x04000330-33F      | EDGE_COLOR       | R/W
//! 0x04000340          | ALPHA_TEST_REF   | R/W
//! 0x04000350          | CLEAR_COLOR      | R/W
//! 0x04000354          | CLEAR_DEPTH      | R/W
//! 0x04000356          | CLRIMAGE_OFFSET  | R/W
//! 0x04000358          | FOG_COLOR        | R/W
//! 0x0400035C          | FOG_OFFSET       | R/W
//! 0x04000360-37F      | FOG_TABLE        | R/W
//! 0x04000380-3BF      | TOON_TABLE       | R/W
//! 0x04000400-43F      | GXFIFO (packed)  | W
//! 0x04000440-5CB      | command ports    | W
//! 0x04000600          | GXSTAT           | R/W
//! 0x04000604          | RAM_COUNT        | R
//! 0x04000610          | DISP_1DOT_DEPTH  | R/W
//! 0x04000620-62F      | POS_RESULT       | R
//! 0x04000630-635      | VEC_RESULT       | R
//! 0x04000640-67F      | CLIPMTX_RESULT   | R
//! 0x04000680-6A3      | VECMTX_RESULT    | R
//! ```
//!
//! The rasterizer control registers are stored as written; nothing in the
//! geometry engine interprets them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::fifo::FIFO_CAPACITY;
use super::GeometryEngine;
use crate::core::error::{EmulatorError, Result};
use crate::core::timing::Scheduler;

/// Register addresses
pub mod regs {
    pub const DISP3DCNT: u32 = 0x0400_0060;
    pub const EDGE_COLOR: u32 = 0x0400_0330;
    pub const ALPHA_TEST_REF: u32 = 0x0400_0340;
    pub const CLEAR_COLOR: u32 = 0x0400_0350;
    pub const CLEAR_DEPTH: u32 = 0x0400_0354;
    pub const CLRIMAGE_OFFSET: u32 = 0x0400_0356;
    pub const FOG_COLOR: u32 = 0x0400_0358;
    pub const FOG_OFFSET: u32 = 0x0400_035C;
    pub const FOG_TABLE: u32 = 0x0400_0360;
    pub const TOON_TABLE: u32 = 0x0400_0380;

    pub const GXFIFO: u32 = 0x0400_0400;
    pub const GXFIFO_END: u32 = 0x0400_0440;
    pub const COMMAND_PORTS: u32 = 0x0400_0440;
    pub const COMMAND_PORTS_END: u32 = 0x0400_05CC;

    pub const GXSTAT: u32 = 0x0400_0600;
    pub const RAM_COUNT: u32 = 0x0400_0604;
    pub const DISP_1DOT_DEPTH: u32 = 0x0400_0610;
    pub const POS_RESULT: u32 = 0x0400_0620;
    pub const VEC_RESULT: u32 = 0x0400_0630;
    pub const CLIPMTX_RESULT: u32 = 0x0400_0640;
    pub const VECMTX_RESULT: u32 = 0x0400_0680;
    pub const VECMTX_RESULT_END: u32 = 0x0400_06A4;

    /// Direct command port for `command` (0x04000400 + opcode * 4)
    pub const fn command_port(command: u8) -> u32 {
        GXFIFO + ((command as u32 & 0x7F) << 2)
    }
}

bitflags! {
    /// GXSTAT single-bit flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GxStat: u32 {
        const MATRIX_STACK_ERROR = 1 << 15;
        const FIFO_FULL = 1 << 24;
        const FIFO_LESS_THAN_HALF = 1 << 25;
        const FIFO_EMPTY = 1 << 26;
        const BUSY = 1 << 27;
    }
}

/// GXFIFO interrupt condition (GXSTAT bits 30-31)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FifoIrqMode {
    #[default]
    Never = 0,
    LessThanHalf = 1,
    Empty = 2,
    Reserved = 3,
}

impl FifoIrqMode {
    pub fn from_bits(value: u32) -> Self {
        match value & 0x3 {
            0 => Self::Never,
            1 => Self::LessThanHalf,
            2 => Self::Empty,
            _ => Self::Reserved,
        }
    }
}

/// Rasterizer control registers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderControl {
    pub disp3dcnt: u16,
    pub edge_colours: [u16; 8],
    pub alpha_test_ref: u8,
    pub clear_colour: u32,
    pub clear_depth: u16,
    pub clrimage_offset: u16,
    pub fog_colour: u32,
    pub fog_offset: u16,
    pub fog_table: [u8; 32],
    pub toon_table: [u16; 32],
    pub disp_1dot_depth: u16,
}

fn set_byte_u16(reg: &mut u16, address: u32, value: u8) {
    let shift = (address & 1) * 8;
    *reg = (*reg & !(0xFF << shift)) | ((value as u16) << shift);
}

fn set_byte_u32(reg: &mut u32, address: u32, value: u8) {
    let shift = (address & 3) * 8;
    *reg = (*reg & !(0xFF << shift)) | ((value as u32) << shift);
}

impl RenderControl {
    /// Write one byte, returning false if `address` is not a control register
    pub fn write_byte(&mut self, address: u32, value: u8) -> bool {
        use regs::*;

        match address {
            DISP3DCNT..=0x0400_0061 => set_byte_u16(&mut self.disp3dcnt, address, value),
            EDGE_COLOR..=0x0400_033F => {
                let index = ((address - EDGE_COLOR) / 2) as usize;
                set_byte_u16(&mut self.edge_colours[index], address, value);
            }
            ALPHA_TEST_REF => self.alpha_test_ref = value,
            CLEAR_COLOR..=0x0400_0353 => set_byte_u32(&mut self.clear_colour, address, value),
            CLEAR_DEPTH..=0x0400_0355 => set_byte_u16(&mut self.clear_depth, address, value),
            CLRIMAGE_OFFSET..=0x0400_0357 => {
                set_byte_u16(&mut self.clrimage_offset, address, value)
            }
            FOG_COLOR..=0x0400_035B => set_byte_u32(&mut self.fog_colour, address, value),
            FOG_OFFSET..=0x0400_035D => set_byte_u16(&mut self.fog_offset, address, value),
            FOG_TABLE..=0x0400_037F => self.fog_table[(address - FOG_TABLE) as usize] = value,
            TOON_TABLE..=0x0400_03BF => {
                let index = ((address - TOON_TABLE) / 2) as usize;
                set_byte_u16(&mut self.toon_table[index], address, value);
            }
            DISP_1DOT_DEPTH..=0x0400_0611 => {
                set_byte_u16(&mut self.disp_1dot_depth, address, value)
            }
            _ => return false,
        }

        true
    }

    /// Read one byte
    pub fn read_byte(&self, address: u32) -> Option<u8> {
        use regs::*;

        let half = |reg: u16| (reg >> ((address & 1) * 8)) as u8;
        let word = |reg: u32| (reg >> ((address & 3) * 8)) as u8;

        let value = match address {
            DISP3DCNT..=0x0400_0061 => half(self.disp3dcnt),
            EDGE_COLOR..=0x0400_033F => half(self.edge_colours[((address - EDGE_COLOR) / 2) as usize]),
            ALPHA_TEST_REF => self.alpha_test_ref,
            CLEAR_COLOR..=0x0400_0353 => word(self.clear_colour),
            CLEAR_DEPTH..=0x0400_0355 => half(self.clear_depth),
            CLRIMAGE_OFFSET..=0x0400_0357 => half(self.clrimage_offset),
            FOG_COLOR..=0x0400_035B => word(self.fog_colour),
            FOG_OFFSET..=0x0400_035D => half(self.fog_offset),
            FOG_TABLE..=0x0400_037F => self.fog_table[(address - FOG_TABLE) as usize],
            TOON_TABLE..=0x0400_03BF => half(self.toon_table[((address - TOON_TABLE) / 2) as usize]),
            DISP_1DOT_DEPTH..=0x0400_0611 => half(self.disp_1dot_depth),
            _ => return None,
        };

        Some(value)
    }
}

impl GeometryEngine {
    /// Whether `address` falls in the geometry engine's register window
    pub fn handles(address: u32) -> bool {
        use regs::*;

        matches!(
            address,
            DISP3DCNT..=0x0400_0063 | EDGE_COLOR..=0x0400_03BF | GXFIFO..=0x0400_06A3
        )
    }

    /// Read GXSTAT
    pub fn read_gxstat(&self) -> u32 {
        let fifo_len = self.queue.fifo_len();

        let mut flags = GxStat::empty();
        if self.stack_error() {
            flags |= GxStat::MATRIX_STACK_ERROR;
        }
        if fifo_len >= FIFO_CAPACITY {
            flags |= GxStat::FIFO_FULL;
        }
        if fifo_len < FIFO_CAPACITY / 2 {
            flags |= GxStat::FIFO_LESS_THAN_HALF;
        }
        if fifo_len == 0 {
            flags |= GxStat::FIFO_EMPTY;
        }
        if self.busy || !self.queue.is_empty() {
            flags |= GxStat::BUSY;
        }

        flags.bits()
            | ((self.modelview.pointer() as u32 & 0x1F) << 8)
            | ((self.projection.pointer() as u32 & 0x1) << 13)
            | ((fifo_len as u32 & 0x1FF) << 16)
            | ((self.irq_mode as u32) << 30)
    }

    /// Write GXSTAT
    ///
    /// Bits 30-31 select the FIFO interrupt condition. Writing 1 to bit 15
    /// clears the matrix stack error and rewinds the projection stack.
    pub fn write_gxstat(&mut self, value: u32) {
        if value & GxStat::MATRIX_STACK_ERROR.bits() != 0 {
            self.projection.acknowledge_error(true);
            self.modelview.acknowledge_error(false);
            self.direction.acknowledge_error(false);
            self.texture_matrix.acknowledge_error(false);
        }

        let mode = FifoIrqMode::from_bits(value >> 30);
        if mode != self.irq_mode {
            log::debug!("GX: FIFO interrupt mode {:?}", mode);
        }
        self.irq_mode = mode;
        self.check_fifo_interrupt();
    }

    /// Read RAM_COUNT
    pub fn read_ram_count(&self) -> u32 {
        (self.polygon_ram.len() as u32 & 0xFFF) | ((self.vertex_ram.len() as u32 & 0x1FFF) << 16)
    }

    /// 32-bit register write
    pub fn write32(&mut self, scheduler: &mut dyn Scheduler, address: u32, value: u32) -> Result<()> {
        use regs::*;

        match address {
            GXFIFO..GXFIFO_END => self.write_packed_command(scheduler, value),
            COMMAND_PORTS..COMMAND_PORTS_END => self.write_direct_command(scheduler, address, value),
            GXSTAT => {
                self.write_gxstat(value);
                Ok(())
            }
            RAM_COUNT | POS_RESULT..VECMTX_RESULT_END => {
                log::warn!(
                    "GX: write to read-only register 0x{:08X} = 0x{:08X} ignored",
                    address,
                    value
                );
                Ok(())
            }
            _ => {
                let mut handled = false;
                for i in 0..4 {
                    handled |= self
                        .control
                        .write_byte(address.wrapping_add(i), (value >> (i * 8)) as u8);
                }
                if handled {
                    Ok(())
                } else {
                    Err(EmulatorError::InvalidMemoryAccess { address })
                }
            }
        }
    }

    /// 16-bit register write
    ///
    /// The command ports only accept 32-bit writes.
    pub fn write16(&mut self, _scheduler: &mut dyn Scheduler, address: u32, value: u16) -> Result<()> {
        use regs::*;

        match address {
            GXFIFO..COMMAND_PORTS_END => {
                log::warn!(
                    "GX: 16-bit write to command port 0x{:08X} ignored",
                    address
                );
                Ok(())
            }
            GXSTAT => {
                self.write_gxstat(value as u32 | ((self.irq_mode as u32) << 30));
                Ok(())
            }
            0x0400_0602 => {
                self.write_gxstat((value as u32) << 16);
                Ok(())
            }
            RAM_COUNT..=0x0400_0607 | POS_RESULT..VECMTX_RESULT_END => {
                log::warn!("GX: write to read-only register 0x{:08X} ignored", address);
                Ok(())
            }
            _ => {
                let low = self.control.write_byte(address, value as u8);
                let high = self.control.write_byte(address.wrapping_add(1), (value >> 8) as u8);
                if low || high {
                    Ok(())
                } else {
                    Err(EmulatorError::InvalidMemoryAccess { address })
                }
            }
        }
    }

    /// 32-bit register read
    pub fn read32(&self, address: u32) -> Result<u32> {
        use regs::*;

        let value = match address {
            GXFIFO..COMMAND_PORTS_END => 0,
            GXSTAT => self.read_gxstat(),
            RAM_COUNT => self.read_ram_count(),
            POS_RESULT..VEC_RESULT => {
                self.position_result[((address - POS_RESULT) / 4) as usize] as u32
            }
            VEC_RESULT => {
                (self.vector_result[0] as u16 as u32) | ((self.vector_result[1] as u16 as u32) << 16)
            }
            0x0400_0634 => self.vector_result[2] as u16 as u32,
            CLIPMTX_RESULT..VECMTX_RESULT => {
                self.clip.cell(((address - CLIPMTX_RESULT) / 4) as usize) as u32
            }
            VECMTX_RESULT..VECMTX_RESULT_END => {
                let index = ((address - VECMTX_RESULT) / 4) as usize;
                self.direction.current.field[index / 3][index % 3] as u32
            }
            _ => {
                let bytes: Vec<Option<u8>> = (0..4)
                    .map(|i| self.control.read_byte(address.wrapping_add(i)))
                    .collect();
                if bytes.iter().all(Option::is_none) {
                    return Err(EmulatorError::InvalidMemoryAccess { address });
                }
                bytes
                    .iter()
                    .enumerate()
                    .fold(0u32, |acc, (i, b)| acc | ((b.unwrap_or(0) as u32) << (i * 8)))
            }
        };

        Ok(value)
    }

    /// 16-bit register read
    pub fn read16(&self, address: u32) -> Result<u16> {
        let word = self.read32(address & !0x3)?;
        Ok((word >> ((address & 0x2) * 8)) as u16)
    }
}
