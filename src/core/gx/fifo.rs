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

//! Geometry command FIFO
//!
//! Commands reach the geometry engine through a 4-entry pipe fed from a
//! 256-entry FIFO. Both the direct command registers and the packed GXFIFO
//! register produce [`Entry`] values that go through the same
//! `queue_entry` path.
//!
//! ```text
//!   CPU write ──► queue_entry ──► FIFO (256) ──refill──► PIPE (4) ──► dispatcher
//!                      │                                   ▲
//!                      └──── FIFO empty, pipe has room ────┘
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::command::{self, opcodes};
use super::GeometryEngine;
use crate::core::error::Result;
use crate::core::timing::Scheduler;

/// FIFO capacity in entries
pub const FIFO_CAPACITY: usize = 256;

/// Pipe capacity in entries
pub const PIPE_CAPACITY: usize = 4;

/// Pipe occupancy below which a refill happens
const PIPE_REFILL_THRESHOLD: usize = 3;

/// Entries moved from the FIFO per refill
const PIPE_REFILL_COUNT: usize = 2;

/// One queued unit of work: a command byte and one parameter word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub command: u8,
    pub parameter: u32,
}

impl Entry {
    pub const fn new(command: u8, parameter: u32) -> Self {
        Self { command, parameter }
    }
}

/// Two-stage command buffer plus the packed GXFIFO staging register
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pub(in crate::core::gx) fifo: VecDeque<Entry>,
    pub(in crate::core::gx) pipe: VecDeque<Entry>,

    /// Packed command bytes waiting for their parameters
    pub(in crate::core::gx) gxfifo: u32,

    /// Parameters received for the command in the low byte of `gxfifo`
    pub(in crate::core::gx) gxfifo_write_count: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            fifo: VecDeque::with_capacity(FIFO_CAPACITY),
            pipe: VecDeque::with_capacity(PIPE_CAPACITY),
            gxfifo: 0,
            gxfifo_write_count: 0,
        }
    }

    /// Total queued entries (FIFO + pipe)
    #[inline]
    pub fn len(&self) -> usize {
        self.fifo.len() + self.pipe.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty() && self.pipe.is_empty()
    }

    #[inline]
    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    #[inline]
    pub fn pipe_len(&self) -> usize {
        self.pipe.len()
    }

    #[inline]
    pub fn is_fifo_full(&self) -> bool {
        self.fifo.len() >= FIFO_CAPACITY
    }

    /// Packed staging register value
    pub fn staged(&self) -> u32 {
        self.gxfifo
    }

    /// Command at the head of the queue
    pub fn peek_command(&self) -> Option<u8> {
        self.pipe
            .front()
            .or_else(|| self.fifo.front())
            .map(|entry| entry.command)
    }

    /// Append an entry
    ///
    /// Goes straight to the pipe while the FIFO is empty and the pipe has
    /// room. The caller is responsible for keeping the FIFO under capacity.
    pub fn push(&mut self, entry: Entry) {
        if self.fifo.is_empty() && self.pipe.len() < PIPE_CAPACITY {
            self.pipe.push_back(entry);
        } else {
            self.fifo.push_back(entry);
        }
    }

    /// Remove the head entry and refill the pipe
    pub fn pop(&mut self) -> Option<Entry> {
        let entry = self.pipe.pop_front();
        self.refill_pipe();
        entry
    }

    fn refill_pipe(&mut self) {
        if self.pipe.len() >= PIPE_REFILL_THRESHOLD {
            return;
        }

        for _ in 0..PIPE_REFILL_COUNT {
            match self.fifo.pop_front() {
                Some(entry) => self.pipe.push_back(entry),
                None => break,
            }
        }
    }

    /// Iterate queued entries in execution order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.pipe.iter().chain(self.fifo.iter())
    }

    pub fn clear(&mut self) {
        self.fifo.clear();
        self.pipe.clear();
        self.gxfifo = 0;
        self.gxfifo_write_count = 0;
    }
}

impl GeometryEngine {
    /// Write to a direct command register (0x04000440..0x040005CC)
    ///
    /// The opcode comes from the address, the written word is the parameter.
    pub(in crate::core::gx) fn write_direct_command(
        &mut self,
        scheduler: &mut dyn Scheduler,
        address: u32,
        value: u32,
    ) -> Result<()> {
        let command = ((address >> 2) & 0x7F) as u8;

        if command == opcodes::NOP || !command::is_valid(command) {
            log::warn!(
                "GX: write to unused command port 0x{:08X} = 0x{:08X} ignored",
                address,
                value
            );
            return Ok(());
        }

        self.queue_entry(scheduler, Entry::new(command, value))
    }

    /// Write to the packed GXFIFO register (0x04000400..0x04000440)
    ///
    /// With nothing staged the word is latched as up to four packed command
    /// bytes. Otherwise it is the next parameter for the command in the low
    /// staged byte. Leading commands that take no parameters are queued as
    /// soon as they reach the low byte.
    pub(in crate::core::gx) fn write_packed_command(
        &mut self,
        scheduler: &mut dyn Scheduler,
        value: u32,
    ) -> Result<()> {
        if self.queue.gxfifo == 0 {
            self.queue.gxfifo = value;
            self.queue.gxfifo_write_count = 0;
            log::trace!("GX: packed commands staged 0x{:08X}", value);
        } else {
            let command = self.queue.gxfifo as u8;
            self.queue_entry(scheduler, Entry::new(command, value))?;

            self.queue.gxfifo_write_count += 1;
            if self.queue.gxfifo_write_count >= command::parameter_count(command) {
                self.queue.gxfifo_write_count = 0;
                self.queue.gxfifo >>= 8;
            }
        }

        self.drain_packed_commands(scheduler)
    }

    fn drain_packed_commands(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        while self.queue.gxfifo != 0 {
            let command = self.queue.gxfifo as u8;
            if command::parameter_count(command) != 0 {
                break;
            }

            if command != opcodes::NOP {
                self.queue_entry(scheduler, Entry::new(command, 0))?;
            }
            self.queue.gxfifo >>= 8;
        }

        Ok(())
    }

    /// Enqueue one entry and try to dispatch
    ///
    /// A full FIFO is drained synchronously first, so the write always lands.
    pub fn queue_entry(&mut self, scheduler: &mut dyn Scheduler, entry: Entry) -> Result<()> {
        if self.queue.is_fifo_full() {
            self.drain_full_fifo(scheduler)?;
        }

        self.queue.push(entry);
        log::trace!(
            "GX: queued {} 0x{:08X} (fifo={}, pipe={})",
            command::name(entry.command),
            entry.parameter,
            self.queue.fifo_len(),
            self.queue.pipe_len()
        );

        self.run_command(scheduler)
    }

    /// Remove the head entry for the running command
    ///
    /// Handlers only call this after the dispatcher has checked that enough
    /// entries are queued, so an empty queue here is a bookkeeping bug.
    pub(in crate::core::gx) fn dequeue_entry(&mut self) -> Entry {
        let entry = match self.queue.pop() {
            Some(entry) => entry,
            None => {
                log::error!("GX: dequeue from empty command pipe");
                Entry::default()
            }
        };

        self.check_fifo_interrupt();
        entry
    }

    /// Dequeue `K` entries and return their parameters
    pub(in crate::core::gx) fn dequeue_parameters<const K: usize>(&mut self) -> [u32; K] {
        std::array::from_fn(|_| self.dequeue_entry().parameter)
    }

    pub(in crate::core::gx) fn check_fifo_interrupt(&mut self) {
        let fifo_len = self.queue.fifo_len();
        let raise = match self.irq_mode {
            super::FifoIrqMode::LessThanHalf => fifo_len < FIFO_CAPACITY / 2,
            super::FifoIrqMode::Empty => fifo_len == 0,
            super::FifoIrqMode::Never | super::FifoIrqMode::Reserved => false,
        };

        if raise && !self.irq_pending {
            log::debug!("GX: FIFO interrupt ({:?}, fifo={})", self.irq_mode, fifo_len);
            self.irq_pending = true;
        }
    }
}
