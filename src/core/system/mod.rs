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

//! System integration module
//!
//! This module ties the geometry engine, the interrupt controller and the
//! scheduler together behind a small ARM9-side I/O bus and drives them
//! through the timing system.

use super::config::Config;
use super::error::{EmulatorError, Result};
use super::gx::GeometryEngine;
use super::interrupt::{interrupts, regs as irq_regs, InterruptController};
use super::save_state::{SaveState, StateSave};
use super::script::{Op, ReadResult, Script, ScriptReport, DEFAULT_IDLE_LIMIT};
use super::timing::{TickCount, TimingEventManager};

/// NDS 3D geometry system
///
/// Owns every component and routes register accesses between them.
///
/// # Components
/// - Geometry engine: GXFIFO, matrix pipeline, vertex and polygon RAM
/// - Interrupt controller: IME, IE, IF
/// - Timing: command busy events
///
/// # Example
/// ```
/// use dsrx::core::gx::{opcodes, regs};
/// use dsrx::core::System;
///
/// let mut system = System::new();
/// system
///     .write32(regs::command_port(opcodes::MTX_IDENTITY), 0)
///     .unwrap();
/// system.run_until_idle(1000).unwrap();
/// assert!(system.gx().is_idle());
/// ```
pub struct System {
    /// Geometry engine
    gx: GeometryEngine,
    /// Interrupt controller
    interrupt_controller: InterruptController,
    /// Timing event manager
    timing: TimingEventManager,
    /// Active configuration
    config: Config,
}

impl System {
    /// Create a new System with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new System from configuration
    ///
    /// Registers the geometry engine's timing events.
    pub fn with_config(config: Config) -> Self {
        let mut timing = TimingEventManager::new();
        let mut gx = GeometryEngine::with_config(&config.geometry);
        gx.register_events(&mut timing);

        log::info!(
            "System initialized (command latency {}, strict commands {})",
            config.geometry.command_latency,
            config.geometry.strict_commands
        );

        Self {
            gx,
            interrupt_controller: InterruptController::new(),
            timing,
            config,
        }
    }

    /// Reset all components to power-on state
    ///
    /// Configuration and event registrations are kept.
    pub fn reset(&mut self) {
        self.timing.reset();
        self.gx.reset(&mut self.timing);
        self.interrupt_controller.reset();
        log::info!("System reset");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gx(&self) -> &GeometryEngine {
        &self.gx
    }

    pub fn gx_mut(&mut self) -> &mut GeometryEngine {
        &mut self.gx
    }

    pub fn interrupt_controller(&self) -> &InterruptController {
        &self.interrupt_controller
    }

    pub fn interrupt_controller_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupt_controller
    }

    pub fn timing(&self) -> &TimingEventManager {
        &self.timing
    }

    /// Elapsed scheduler ticks since reset
    pub fn ticks(&self) -> u64 {
        self.timing.global_tick_counter
    }

    /// 32-bit bus write
    ///
    /// # Errors
    ///
    /// - `UnalignedAccess` if `address` is not word aligned
    /// - `InvalidMemoryAccess` if nothing is mapped at `address`
    /// - Geometry errors raised by commands the write dispatched
    pub fn write32(&mut self, address: u32, value: u32) -> Result<()> {
        check_alignment(address, 4)?;

        if GeometryEngine::handles(address) {
            self.gx.write32(&mut self.timing, address, value)?;
            self.poll_interrupts();
            Ok(())
        } else if self.interrupt_controller.write32(address, value) {
            Ok(())
        } else {
            Err(EmulatorError::InvalidMemoryAccess { address })
        }
    }

    /// 16-bit bus write
    pub fn write16(&mut self, address: u32, value: u16) -> Result<()> {
        check_alignment(address, 2)?;

        if GeometryEngine::handles(address) {
            self.gx.write16(&mut self.timing, address, value)?;
            self.poll_interrupts();
            return Ok(());
        }

        if !InterruptController::handles(address) {
            return Err(EmulatorError::InvalidMemoryAccess { address });
        }

        let word = address & !0x3;
        let shift = (address & 0x2) * 8;
        let value = if word == irq_regs::IF {
            // Write-1-to-clear, leave the other half alone
            (value as u32) << shift
        } else {
            let current = self.interrupt_controller.read32(word).unwrap_or(0);
            (current & !(0xFFFF << shift)) | ((value as u32) << shift)
        };
        self.interrupt_controller.write32(word, value);
        Ok(())
    }

    /// 32-bit bus read
    pub fn read32(&self, address: u32) -> Result<u32> {
        check_alignment(address, 4)?;

        if GeometryEngine::handles(address) {
            return self.gx.read32(address);
        }
        self.interrupt_controller
            .read32(address)
            .ok_or(EmulatorError::InvalidMemoryAccess { address })
    }

    /// 16-bit bus read
    pub fn read16(&self, address: u32) -> Result<u16> {
        check_alignment(address, 2)?;

        if GeometryEngine::handles(address) {
            return self.gx.read16(address);
        }
        let word = self
            .interrupt_controller
            .read32(address & !0x3)
            .ok_or(EmulatorError::InvalidMemoryAccess { address })?;
        Ok((word >> ((address & 0x2) * 8)) as u16)
    }

    /// Advance emulated time by `ticks`
    ///
    /// Time moves in steps bounded by the scheduler's downcount so every
    /// event fires on its deadline.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        let mut remaining = ticks;

        while remaining > 0 {
            let step = (self.timing.downcount.max(1) as u64).min(remaining);
            self.advance(step as TickCount)?;
            remaining -= step;
        }

        Ok(())
    }

    /// Run until the geometry engine is idle or `max_ticks` have elapsed
    ///
    /// # Returns
    ///
    /// Ticks consumed. Hitting the limit is not an error; check
    /// `gx().is_idle()` when it matters.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> Result<u64> {
        let mut elapsed = 0;

        while !self.gx.is_idle() && elapsed < max_ticks {
            let step = (self.timing.downcount.max(1) as u64).min(max_ticks - elapsed);
            self.advance(step as TickCount)?;
            elapsed += step;
        }

        if !self.gx.is_idle() {
            log::warn!("Geometry engine still busy after {} ticks", elapsed);
        }

        Ok(elapsed)
    }

    /// Replay a register script
    ///
    /// Stops at the first bus error. Read mismatches are recorded in the
    /// report, not raised.
    pub fn run_script(&mut self, script: &Script) -> Result<ScriptReport> {
        let mut report = ScriptReport::default();

        for (index, op) in script.ops.iter().enumerate() {
            log::trace!("Script op {}: {:?}", index, op);

            match *op {
                Op::Write32 { addr, value } => self.write32(addr, value)?,
                Op::Write16 { addr, value } => self.write16(addr, value)?,
                Op::Read32 { addr, expect } => {
                    let value = self.read32(addr)?;
                    let read = ReadResult {
                        addr,
                        value,
                        expect,
                    };
                    if !read.matches() {
                        log::warn!(
                            "Script op {}: read 0x{:08X} = 0x{:08X}, expected 0x{:08X}",
                            index,
                            addr,
                            value,
                            expect.unwrap_or_default()
                        );
                    }
                    report.reads.push(read);
                }
                Op::Run { ticks } => {
                    let ticks = ticks.max(0) as u64;
                    self.run(ticks)?;
                    report.ticks += ticks;
                }
                Op::Idle { max_ticks } => {
                    report.ticks += self.run_until_idle(max_ticks.unwrap_or(DEFAULT_IDLE_LIMIT))?;
                }
            }

            report.ops += 1;
        }

        log::info!(
            "Script finished: {} ops, {} ticks, {} reads",
            report.ops,
            report.ticks,
            report.reads.len()
        );
        Ok(report)
    }

    /// Capture a save state
    pub fn save_state(&self) -> SaveState {
        SaveState::from_system(self)
    }

    /// Restore a save state and resume command dispatch
    pub fn load_state(&mut self, state: &SaveState) -> Result<()> {
        StateSave::restore_from_state(&mut self.gx, &state.geometry)?;
        StateSave::restore_from_state(&mut self.interrupt_controller, &state.interrupts)?;

        self.gx.resume(&mut self.timing)?;
        self.poll_interrupts();

        log::info!("Save state loaded (frame {})", state.metadata.frame_count);
        Ok(())
    }

    /// Move time forward by one step and service fired events
    fn advance(&mut self, ticks: TickCount) -> Result<()> {
        self.timing.pending_ticks += ticks;
        let triggered = self.timing.run_events();
        self.gx.process_events(&mut self.timing, &triggered)?;
        self.poll_interrupts();
        Ok(())
    }

    /// Forward the geometry engine's FIFO interrupt to IF
    fn poll_interrupts(&mut self) {
        if self.gx.poll_interrupt() {
            self.interrupt_controller.request(interrupts::GXFIFO);
        }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

fn check_alignment(address: u32, size: u8) -> Result<()> {
    if address % size as u32 != 0 {
        return Err(EmulatorError::UnalignedAccess { address, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
