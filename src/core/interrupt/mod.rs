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

//! NDS (ARM9) Interrupt Controller Implementation
//!
//! The interrupt controller latches interrupt requests from hardware components
//! and decides whether the CPU should take an IRQ.
//!
//! ## Registers
//!
//! - **IME** (0x04000208): Interrupt master enable (bit 0)
//! - **IE** (0x04000210): Interrupt enable, one bit per source
//! - **IF** (0x04000214): Interrupt request flags
//!   - Reading returns the latched requests
//!   - Writing 1 to a bit acknowledges that interrupt (clears the bit)
//!   - Writing 0 to a bit has no effect
//!
//! ## Interrupt Sources (Bit Positions)
//!
//! ```text
//! Bit  | Source              | Description
//! -----|---------------------|----------------------------------
//! 0    | VBLANK              | LCD vertical blank
//! 1    | HBLANK              | LCD horizontal blank
//! 2    | VCOUNT              | LCD V-counter match
//! 3-6  | TIMER0..TIMER3      | Timer overflow
//! 8-11 | DMA0..DMA3          | DMA transfer complete
//! 12   | KEYPAD              | Keypad
//! 13   | GAMECART            | GBA slot
//! 16   | IPC_SYNC            | IPC sync
//! 17   | IPC_SEND_EMPTY      | IPC send FIFO empty
//! 18   | IPC_RECV_NOT_EMPTY  | IPC receive FIFO not empty
//! 19   | CARD_TRANSFER       | NDS slot transfer complete
//! 20   | CARD_IREQ           | NDS slot IREQ_MC
//! 21   | GXFIFO              | Geometry command FIFO
//! ```
//!
//! ## References
//!
//! - [GBATEK: DS Interrupts](https://problemkaputt.de/gbatek.htm#dsinterrupts)

use serde::{Deserialize, Serialize};

/// Interrupt source bit flags
///
/// These constants represent the bit positions in IE and IF for each source.
pub mod interrupts {
    /// LCD vertical blank (bit 0)
    pub const VBLANK: u32 = 1 << 0;

    /// LCD horizontal blank (bit 1)
    pub const HBLANK: u32 = 1 << 1;

    /// LCD V-counter match (bit 2)
    pub const VCOUNT: u32 = 1 << 2;

    /// Timer 0 overflow (bit 3)
    pub const TIMER0: u32 = 1 << 3;

    /// Timer 1 overflow (bit 4)
    pub const TIMER1: u32 = 1 << 4;

    /// Timer 2 overflow (bit 5)
    pub const TIMER2: u32 = 1 << 5;

    /// Timer 3 overflow (bit 6)
    pub const TIMER3: u32 = 1 << 6;

    /// DMA 0 complete (bit 8)
    pub const DMA0: u32 = 1 << 8;

    /// DMA 1 complete (bit 9)
    pub const DMA1: u32 = 1 << 9;

    /// DMA 2 complete (bit 10)
    pub const DMA2: u32 = 1 << 10;

    /// DMA 3 complete (bit 11)
    pub const DMA3: u32 = 1 << 11;

    /// Keypad (bit 12)
    pub const KEYPAD: u32 = 1 << 12;

    /// GBA slot (bit 13)
    pub const GAMECART: u32 = 1 << 13;

    /// IPC sync (bit 16)
    pub const IPC_SYNC: u32 = 1 << 16;

    /// IPC send FIFO empty (bit 17)
    pub const IPC_SEND_EMPTY: u32 = 1 << 17;

    /// IPC receive FIFO not empty (bit 18)
    pub const IPC_RECV_NOT_EMPTY: u32 = 1 << 18;

    /// NDS slot transfer complete (bit 19)
    pub const CARD_TRANSFER: u32 = 1 << 19;

    /// NDS slot IREQ_MC (bit 20)
    pub const CARD_IREQ: u32 = 1 << 20;

    /// Geometry command FIFO (bit 21)
    pub const GXFIFO: u32 = 1 << 21;
}

/// Register addresses handled by the interrupt controller
pub mod regs {
    /// Interrupt master enable
    pub const IME: u32 = 0x0400_0208;
    /// Interrupt enable
    pub const IE: u32 = 0x0400_0210;
    /// Interrupt request flags
    pub const IF: u32 = 0x0400_0214;
}

/// Serializable interrupt controller state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptState {
    pub master_enable: bool,
    pub enable: u32,
    pub flags: u32,
}

/// NDS Interrupt Controller
///
/// Latches interrupt requests and determines which of them reach the CPU
/// based on IME and IE.
///
/// # Example
///
/// ```
/// use dsrx::core::interrupt::{InterruptController, interrupts};
///
/// let mut ic = InterruptController::new();
///
/// // Request the geometry FIFO interrupt
/// ic.request(interrupts::GXFIFO);
///
/// // Enable it
/// ic.write_ime(1);
/// ic.write_ie(interrupts::GXFIFO);
/// assert!(ic.is_pending());
///
/// // Acknowledge (write 1 to clear)
/// ic.write_if(interrupts::GXFIFO);
/// assert!(!ic.is_pending());
/// ```
#[derive(Debug, Default)]
pub struct InterruptController {
    /// IME (0x04000208) - master enable, bit 0
    master_enable: bool,

    /// IE (0x04000210) - per-source enable
    enable: u32,

    /// IF (0x04000214) - latched requests
    flags: u32,
}

impl InterruptController {
    /// Create a new interrupt controller
    ///
    /// Initializes with all interrupts cleared and disabled.
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::interrupt::InterruptController;
    ///
    /// let ic = InterruptController::new();
    /// assert_eq!(ic.read_if(), 0);
    /// assert_eq!(ic.read_ie(), 0);
    /// assert_eq!(ic.read_ime(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            master_enable: false,
            enable: 0,
            flags: 0,
        }
    }

    /// Request an interrupt
    ///
    /// Sets the specified bit(s) in IF. Called on behalf of hardware components.
    ///
    /// # Arguments
    ///
    /// * `interrupt` - Interrupt bit(s) to set (can be multiple ORed together)
    pub fn request(&mut self, interrupt: u32) {
        self.flags |= interrupt;
        log::trace!(
            "IRQ requested: 0x{:08X}, IF=0x{:08X}",
            interrupt,
            self.flags
        );
    }

    /// Acknowledge interrupt (write 1 to clear bits)
    ///
    /// # Arguments
    ///
    /// * `value` - Bits to clear
    pub fn acknowledge(&mut self, value: u32) {
        self.flags &= !value;
        log::trace!("IRQ acknowledged, IF=0x{:08X}", self.flags);
    }

    /// Check if an enabled interrupt is pending for the CPU
    ///
    /// # Returns
    ///
    /// true if IME is set and (IE & IF) != 0
    pub fn is_pending(&self) -> bool {
        self.master_enable && (self.enable & self.flags) != 0
    }

    /// Read IME
    pub fn read_ime(&self) -> u32 {
        self.master_enable as u32
    }

    /// Write IME (only bit 0 is meaningful)
    pub fn write_ime(&mut self, value: u32) {
        self.master_enable = value & 1 != 0;
        log::debug!("IME set: {}", self.master_enable);
    }

    /// Read IE
    pub fn read_ie(&self) -> u32 {
        self.enable
    }

    /// Write IE
    pub fn write_ie(&mut self, value: u32) {
        self.enable = value;
        log::debug!("IE set: 0x{:08X}", self.enable);
    }

    /// Read IF
    pub fn read_if(&self) -> u32 {
        self.flags
    }

    /// Write IF (acknowledge)
    ///
    /// # Example
    ///
    /// ```
    /// use dsrx::core::interrupt::{InterruptController, interrupts};
    ///
    /// let mut ic = InterruptController::new();
    /// ic.request(interrupts::VBLANK | interrupts::GXFIFO);
    /// ic.write_if(interrupts::VBLANK);
    /// assert_eq!(ic.read_if(), interrupts::GXFIFO);
    /// ```
    pub fn write_if(&mut self, value: u32) {
        self.acknowledge(value);
    }

    /// Check whether `address` belongs to this controller's register window
    pub fn handles(address: u32) -> bool {
        matches!(address & !0x3, regs::IME | regs::IE | regs::IF)
    }

    /// Read a 32-bit register
    pub fn read32(&self, address: u32) -> Option<u32> {
        match address {
            regs::IME => Some(self.read_ime()),
            regs::IE => Some(self.read_ie()),
            regs::IF => Some(self.read_if()),
            _ => None,
        }
    }

    /// Write a 32-bit register, returning false for unmapped addresses
    pub fn write32(&mut self, address: u32, value: u32) -> bool {
        match address {
            regs::IME => self.write_ime(value),
            regs::IE => self.write_ie(value),
            regs::IF => self.write_if(value),
            _ => return false,
        }
        true
    }

    /// Snapshot for save states
    pub fn to_state(&self) -> InterruptState {
        InterruptState {
            master_enable: self.master_enable,
            enable: self.enable,
            flags: self.flags,
        }
    }

    /// Restore from a save-state snapshot
    pub fn restore_from_state(&mut self, state: &InterruptState) {
        self.master_enable = state.master_enable;
        self.enable = state.enable;
        self.flags = state.flags;
    }

    /// Reset to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
