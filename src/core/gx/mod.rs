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

//! Geometry engine (GX) implementation
//!
//! This module implements the Nintendo DS 3D geometry engine: the command
//! FIFO fed by the ARM9, the matrix pipeline and vertex/polygon assembly.
//! The engine is responsible for:
//! - Buffering geometry commands in a 256-entry FIFO and 4-entry pipe
//! - Executing matrix commands against four matrix stacks
//! - Transforming vertices by the clip matrix and grouping them into polygons
//! - Handing each finished frame to the renderer on SWAP_BUFFERS
//!
//! Rasterization is not part of this module; a renderer consumes
//! [`RenderBuffers`] and [`RenderControl`].
//!
//! # Fixed point
//!
//! Matrices and coordinates use 12 fractional bits (1.0 = 4096).
//!
//! # Timing
//!
//! Each executed command holds the engine busy for `command_latency` ticks
//! through the "GeometryCommand" scheduler event. Writes keep queueing
//! meanwhile; a full FIFO forces synchronous execution.
//!
//! # References
//!
//! - [GBATEK: DS 3D Video](https://problemkaputt.de/gbatek.htm#ds3dvideo)

// Module declarations
mod command;
mod dispatch;
mod fifo;
mod lighting;
mod matrix;
mod matrix_ops;
mod measure;
mod registers;
mod stack;
mod state;
mod swap;
#[cfg(test)]
mod tests;
mod vertex;

// Public re-exports
pub use command::{opcodes, parameter_count, sign_extend, PARAMETER_COUNTS};
pub use fifo::{CommandQueue, Entry, FIFO_CAPACITY, PIPE_CAPACITY};
pub use lighting::Lighting;
pub use matrix::{multiply, multiply_vertex, Matrix, Vector4, ONE};
pub use matrix_ops::{MatrixMode, Viewport};
pub use registers::{regs, FifoIrqMode, GxStat, RenderControl};
pub use stack::{MatrixStack, MatrixStackState};
pub use state::GeometryState;
pub use swap::RenderBuffers;
pub use vertex::{
    normalize, Polygon, PolygonType, TextureAttributes, Vertex, MAX_POLYGONS, MAX_VERTICES,
};

use crate::core::config::GeometryConfig;
use crate::core::error::Result;
use crate::core::timing::{EventHandle, Scheduler, TickCount};

/// Projection stack depth
pub const PROJECTION_STACK_DEPTH: usize = 1;

/// Modelview and direction stack depth
pub const MODELVIEW_STACK_DEPTH: usize = 31;

/// Texture stack depth
pub const TEXTURE_STACK_DEPTH: usize = 1;

/// Geometry engine state
///
/// # Examples
///
/// ```
/// use dsrx::core::gx::{opcodes, regs, GeometryEngine};
/// use dsrx::core::timing::TimingEventManager;
///
/// let mut timing = TimingEventManager::new();
/// let mut gx = GeometryEngine::new();
/// gx.register_events(&mut timing);
///
/// // MTX_IDENTITY through its command port
/// gx.write32(&mut timing, regs::command_port(opcodes::MTX_IDENTITY), 0).unwrap();
///
/// assert!(gx.is_busy());
/// assert!(gx.queue().is_empty());
/// ```
pub struct GeometryEngine {
    /// Command FIFO, pipe and packed staging register
    pub(in crate::core::gx) queue: CommandQueue,

    /// Set after a dispatch until the command event fires
    pub(in crate::core::gx) busy: bool,

    /// "GeometryCommand" event handle (None until registered)
    pub(in crate::core::gx) command_event: Option<EventHandle>,

    /// Busy time per command, in ticks
    pub(in crate::core::gx) command_latency: TickCount,

    /// Unknown commands and unsupported modes are errors instead of no-ops
    pub(in crate::core::gx) strict_commands: bool,

    /// FIFO interrupt condition (GXSTAT bits 30-31)
    pub(in crate::core::gx) irq_mode: FifoIrqMode,

    /// Latched GXFIFO interrupt, taken by `poll_interrupt`
    pub(in crate::core::gx) irq_pending: bool,

    pub(in crate::core::gx) matrix_mode: MatrixMode,
    pub(in crate::core::gx) projection: MatrixStack<PROJECTION_STACK_DEPTH>,
    pub(in crate::core::gx) modelview: MatrixStack<MODELVIEW_STACK_DEPTH>,
    pub(in crate::core::gx) direction: MatrixStack<MODELVIEW_STACK_DEPTH>,
    pub(in crate::core::gx) texture_matrix: MatrixStack<TEXTURE_STACK_DEPTH>,

    /// modelview * projection
    pub(in crate::core::gx) clip: Matrix,

    pub(in crate::core::gx) polygon_type: PolygonType,

    /// Vertices submitted since BEGIN_VTXS
    pub(in crate::core::gx) vertex_count: usize,

    /// Object-space vertex being built by vertex commands
    pub(in crate::core::gx) current_vertex: Vertex,

    /// Frame under construction
    pub(in crate::core::gx) vertex_ram: Vec<Vertex>,
    pub(in crate::core::gx) polygon_ram: Vec<Polygon>,
    pub(in crate::core::gx) vertex_overflow: bool,
    pub(in crate::core::gx) polygon_overflow: bool,

    pub(in crate::core::gx) texture: TextureAttributes,

    /// POLYGON_ATTR value, latched at BEGIN_VTXS
    pub(in crate::core::gx) pending_polygon_attributes: u32,
    pub(in crate::core::gx) polygon_attributes: u32,

    pub(in crate::core::gx) lighting: Lighting,
    pub(in crate::core::gx) viewport: Viewport,

    /// Last completed frame
    pub(in crate::core::gx) render: RenderBuffers,

    /// POS_RESULT
    pub(in crate::core::gx) position_result: Vector4,

    /// VEC_RESULT
    pub(in crate::core::gx) vector_result: [i16; 3],

    pub(in crate::core::gx) control: RenderControl,
}

impl GeometryEngine {
    /// Default busy time per command
    pub const DEFAULT_COMMAND_LATENCY: TickCount = 1;

    /// Create a geometry engine with default configuration
    pub fn new() -> Self {
        Self::with_config(&GeometryConfig::default())
    }

    /// Create a geometry engine from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Command latency and strictness settings
    pub fn with_config(config: &GeometryConfig) -> Self {
        Self {
            queue: CommandQueue::new(),
            busy: false,
            command_event: None,
            command_latency: config.command_latency.max(0),
            strict_commands: config.strict_commands,
            irq_mode: FifoIrqMode::Never,
            irq_pending: false,
            matrix_mode: MatrixMode::Projection,
            projection: MatrixStack::new(),
            modelview: MatrixStack::new(),
            direction: MatrixStack::new(),
            texture_matrix: MatrixStack::new(),
            clip: Matrix::identity(),
            polygon_type: PolygonType::Triangle,
            vertex_count: 0,
            current_vertex: Vertex::default(),
            vertex_ram: Vec::with_capacity(MAX_VERTICES),
            polygon_ram: Vec::with_capacity(MAX_POLYGONS),
            vertex_overflow: false,
            polygon_overflow: false,
            texture: TextureAttributes::default(),
            pending_polygon_attributes: 0,
            polygon_attributes: 0,
            lighting: Lighting::default(),
            viewport: Viewport::default(),
            render: RenderBuffers::new(),
            position_result: [0; 4],
            vector_result: [0; 3],
            control: RenderControl::default(),
        }
    }

    /// Apply new configuration values
    pub fn configure(&mut self, config: &GeometryConfig) {
        self.command_latency = config.command_latency.max(0);
        self.strict_commands = config.strict_commands;
    }

    /// Register the "GeometryCommand" event with the scheduler
    pub fn register_events(&mut self, scheduler: &mut dyn Scheduler) {
        self.command_event = Some(scheduler.register_event("GeometryCommand"));
        log::debug!("GX: registered GeometryCommand event");
    }

    /// Handle fired scheduler events
    ///
    /// # Arguments
    ///
    /// * `scheduler` - Scheduler used to re-arm the command event
    /// * `triggered` - Handles returned by the scheduler's last run
    pub fn process_events(
        &mut self,
        scheduler: &mut dyn Scheduler,
        triggered: &[EventHandle],
    ) -> Result<()> {
        let Some(handle) = self.command_event else {
            return Ok(());
        };

        if triggered.contains(&handle) {
            self.busy = false;
            self.run_command(scheduler)?;
        }

        Ok(())
    }

    /// Drop the busy latch and dispatch whatever is queued
    ///
    /// Used after restoring a snapshot.
    pub fn resume(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        if let Some(handle) = self.command_event {
            scheduler.deactivate(handle);
        }
        self.busy = false;
        self.run_command(scheduler)
    }

    /// Take the latched GXFIFO interrupt
    pub fn poll_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.irq_pending)
    }

    /// Reset to power-on state
    ///
    /// Keeps configuration and the registered event handle, cancels any
    /// pending command event.
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler) {
        let command_event = self.command_event;
        let config = GeometryConfig {
            command_latency: self.command_latency,
            strict_commands: self.strict_commands,
        };

        *self = Self::with_config(&config);
        self.command_event = command_event;

        if let Some(handle) = command_event {
            scheduler.deactivate(handle);
        }
        log::debug!("GX: reset");
    }

    /// Whether a command is executing (waiting for its event)
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the engine has nothing left it can do without more input
    ///
    /// True when not busy and the head command (if any) is still missing
    /// parameters.
    pub fn is_idle(&self) -> bool {
        if self.busy {
            return false;
        }
        match self.queue.peek_command() {
            Some(command) => self.queue.len() < command::entry_count(command),
            None => true,
        }
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn command_event(&self) -> Option<EventHandle> {
        self.command_event
    }

    pub fn command_latency(&self) -> TickCount {
        self.command_latency
    }

    pub fn strict_commands(&self) -> bool {
        self.strict_commands
    }

    pub fn irq_mode(&self) -> FifoIrqMode {
        self.irq_mode
    }

    pub fn matrix_mode(&self) -> MatrixMode {
        self.matrix_mode
    }

    pub fn clip_matrix(&self) -> &Matrix {
        &self.clip
    }

    pub fn projection(&self) -> &MatrixStack<PROJECTION_STACK_DEPTH> {
        &self.projection
    }

    pub fn modelview(&self) -> &MatrixStack<MODELVIEW_STACK_DEPTH> {
        &self.modelview
    }

    pub fn direction(&self) -> &MatrixStack<MODELVIEW_STACK_DEPTH> {
        &self.direction
    }

    pub fn texture_matrix(&self) -> &MatrixStack<TEXTURE_STACK_DEPTH> {
        &self.texture_matrix
    }

    /// Whether any matrix stack has overflowed or underflowed
    pub fn stack_error(&self) -> bool {
        self.projection.error()
            || self.modelview.error()
            || self.direction.error()
            || self.texture_matrix.error()
    }

    pub fn polygon_type(&self) -> PolygonType {
        self.polygon_type
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn current_vertex(&self) -> &Vertex {
        &self.current_vertex
    }

    /// Vertices of the frame under construction
    pub fn vertex_ram(&self) -> &[Vertex] {
        &self.vertex_ram
    }

    /// Polygons of the frame under construction
    pub fn polygon_ram(&self) -> &[Polygon] {
        &self.polygon_ram
    }

    pub fn texture_attributes(&self) -> &TextureAttributes {
        &self.texture
    }

    pub fn polygon_attributes(&self) -> u32 {
        self.polygon_attributes
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Geometry of the last swapped frame
    pub fn render_buffers(&self) -> &RenderBuffers {
        &self.render
    }

    pub fn render_control(&self) -> &RenderControl {
        &self.control
    }

    pub fn position_result(&self) -> Vector4 {
        self.position_result
    }

    pub fn vector_result(&self) -> [i16; 3] {
        self.vector_result
    }
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new()
    }
}
