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

//! Matrix stacks
//!
//! The geometry engine keeps four stacks: projection (1 slot), modelview
//! (31 slots), direction (31 slots) and texture (1 slot). A single
//! const-generic type covers all four.

use serde::{Deserialize, Serialize};

use super::matrix::Matrix;

/// Bounded stack of fixed-point matrices with a working `current` matrix
///
/// Overflow and underflow never fail: they set a sticky `error` flag that is
/// reported through GXSTAT and only cleared by a reset or acknowledge.
///
/// # Examples
///
/// ```
/// use dsrx::core::gx::{Matrix, MatrixStack};
///
/// let mut stack = MatrixStack::<31>::new();
/// stack.current.field[3][0] = 8 << 12;
/// stack.push();
/// stack.current = Matrix::identity();
/// stack.pop(1);
/// assert_eq!(stack.current.field[3][0], 8 << 12);
/// assert!(!stack.error());
/// ```
#[derive(Debug, Clone)]
pub struct MatrixStack<const N: usize> {
    /// Working matrix for this stack
    pub current: Matrix,
    stack: [Matrix; N],
    pointer: usize,
    error: bool,
}

/// Serializable form of a [`MatrixStack`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixStackState {
    pub current: Matrix,
    pub stack: Vec<Matrix>,
    pub pointer: usize,
    pub error: bool,
}

impl<const N: usize> MatrixStack<N> {
    /// Create a stack with every slot set to identity
    pub fn new() -> Self {
        Self {
            current: Matrix::identity(),
            stack: [Matrix::identity(); N],
            pointer: 0,
            error: false,
        }
    }

    /// Stack depth
    pub const fn depth(&self) -> usize {
        N
    }

    /// Current stack pointer (0..=N)
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Sticky overflow/underflow flag
    pub fn error(&self) -> bool {
        self.error
    }

    /// Matrix stored in `slot`
    pub fn slot(&self, slot: usize) -> Option<&Matrix> {
        self.stack.get(slot)
    }

    /// Push `current` onto the stack
    ///
    /// A push on a full stack is dropped and sets `error`.
    pub fn push(&mut self) {
        if self.pointer == N {
            log::warn!("GX: matrix stack overflow (depth {})", N);
            self.error = true;
            return;
        }

        self.stack[self.pointer] = self.current;
        self.pointer += 1;
    }

    /// Move the pointer back by `offset` and load `current` from there
    ///
    /// `offset` is signed, so a negative value moves the pointer forward. The
    /// pointer is clamped to `0..N`, setting `error` when clamping happens.
    pub fn pop(&mut self, offset: i32) {
        let target = self.pointer as i64 - offset as i64;
        let max = N as i64 - 1;

        let clamped = target.clamp(0, max);
        if clamped != target {
            log::warn!(
                "GX: matrix stack pointer out of range ({} with depth {})",
                target,
                N
            );
            self.error = true;
        }

        self.pointer = clamped as usize;
        self.current = self.stack[self.pointer];
    }

    /// Store `current` into a slot without moving the pointer
    ///
    /// Single-slot stacks ignore `offset`.
    pub fn store(&mut self, offset: usize) {
        match self.slot_index(offset) {
            Some(index) => self.stack[index] = self.current,
            None => self.error = true,
        }
    }

    /// Load `current` from a slot without moving the pointer
    ///
    /// Single-slot stacks ignore `offset`.
    pub fn restore(&mut self, offset: usize) {
        match self.slot_index(offset) {
            Some(index) => self.current = self.stack[index],
            None => self.error = true,
        }
    }

    fn slot_index(&self, offset: usize) -> Option<usize> {
        if N == 1 {
            Some(0)
        } else if offset < N {
            Some(offset)
        } else {
            log::warn!("GX: matrix stack slot {} out of range (depth {})", offset, N);
            None
        }
    }

    /// Clear the error flag and rewind the pointer (GXSTAT acknowledge)
    pub fn acknowledge_error(&mut self, rewind: bool) {
        self.error = false;
        if rewind {
            self.pointer = 0;
        }
    }

    /// Reset to power-on state
    pub fn reset(&mut self) {
        self.error = false;
        self.pointer = 0;
        self.current = Matrix::identity();
        self.stack = [Matrix::identity(); N];
    }

    /// Snapshot for save states
    pub fn to_state(&self) -> MatrixStackState {
        MatrixStackState {
            current: self.current,
            stack: self.stack.to_vec(),
            pointer: self.pointer,
            error: self.error,
        }
    }

    /// True if `state` was taken from a stack of this depth
    pub fn accepts(state: &MatrixStackState) -> bool {
        state.stack.len() == N && state.pointer <= N
    }

    /// Restore from a snapshot
    ///
    /// Returns false if the snapshot depth does not match this stack.
    pub fn restore_from_state(&mut self, state: &MatrixStackState) -> bool {
        if !Self::accepts(state) {
            return false;
        }

        self.current = state.current;
        self.stack.copy_from_slice(&state.stack);
        self.pointer = state.pointer;
        self.error = state.error;
        true
    }
}

impl<const N: usize> Default for MatrixStack<N> {
    fn default() -> Self {
        Self::new()
    }
}
