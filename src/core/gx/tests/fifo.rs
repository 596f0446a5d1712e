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

//! Command queue and GXFIFO tests
//! Tests for pipe refill, parameter counts and packed command writes

use super::super::*;
use super::{fx, send, unscheduled};
use proptest::prelude::*;

#[test]
fn test_parameter_counts() {
    assert_eq!(parameter_count(opcodes::NOP), 0);
    assert_eq!(parameter_count(opcodes::MTX_PUSH), 0);
    assert_eq!(parameter_count(opcodes::MTX_IDENTITY), 0);
    assert_eq!(parameter_count(opcodes::END_VTXS), 0);
    assert_eq!(parameter_count(opcodes::MTX_LOAD_4X4), 16);
    assert_eq!(parameter_count(opcodes::MTX_MULT_4X3), 12);
    assert_eq!(parameter_count(opcodes::MTX_MULT_3X3), 9);
    assert_eq!(parameter_count(opcodes::VTX_16), 2);
    assert_eq!(parameter_count(opcodes::SHININESS), 32);
    assert_eq!(parameter_count(opcodes::BOX_TEST), 3);
    assert_eq!(parameter_count(opcodes::POS_TEST), 2);

    // Only the low seven bits select the opcode
    assert_eq!(parameter_count(0x80 | opcodes::MTX_LOAD_4X4), 16);
    assert_eq!(PARAMETER_COUNTS[0x7F], 0);
}

#[test]
fn test_entry_count_and_validity() {
    assert_eq!(command::entry_count(opcodes::MTX_PUSH), 1);
    assert_eq!(command::entry_count(opcodes::MTX_TRANS), 3);

    assert!(command::is_valid(opcodes::SWAP_BUFFERS));
    assert!(!command::is_valid(0x42));
    assert_eq!(command::name(0x42), "UNKNOWN");
}

#[test]
fn test_bitfield_helpers() {
    assert_eq!(sign_extend(0x3F, 6), -1);
    assert_eq!(sign_extend(0x1F, 6), 31);
    assert_eq!(command::split_i16(0xFFFF_0001), (1, -1));
    assert_eq!(
        command::unpack_10bit(0x3FF | (0x001 << 10) | (0x200 << 20)),
        [-1, 1, -512]
    );
}

#[test]
fn test_queue_fills_pipe_first() {
    let mut queue = CommandQueue::new();
    for i in 0..6 {
        queue.push(Entry::new(opcodes::COLOR, i));
    }

    assert_eq!(queue.pipe_len(), PIPE_CAPACITY);
    assert_eq!(queue.fifo_len(), 2);
    assert_eq!(queue.len(), 6);
}

#[test]
fn test_pipe_refills_two_at_a_time() {
    let mut queue = CommandQueue::new();
    for i in 0..8 {
        queue.push(Entry::new(opcodes::COLOR, i));
    }

    // 4 in the pipe: one pop leaves 3, no refill
    assert_eq!(queue.pop().map(|e| e.parameter), Some(0));
    assert_eq!(queue.pipe_len(), 3);
    assert_eq!(queue.fifo_len(), 4);

    // Below three: two entries move over
    assert_eq!(queue.pop().map(|e| e.parameter), Some(1));
    assert_eq!(queue.pipe_len(), 4);
    assert_eq!(queue.fifo_len(), 2);
}

#[test]
fn test_push_goes_to_fifo_once_it_is_non_empty() {
    let mut queue = CommandQueue::new();
    for i in 0..5 {
        queue.push(Entry::new(opcodes::COLOR, i));
    }
    queue.pop();
    assert_eq!(queue.pipe_len(), 3);
    assert_eq!(queue.fifo_len(), 1);

    // Pipe has room but the FIFO holds older entries
    queue.push(Entry::new(opcodes::COLOR, 5));
    assert_eq!(queue.fifo_len(), 2);

    let order: Vec<u32> = queue.iter().map(|e| e.parameter).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_peek_and_clear() {
    let mut queue = CommandQueue::new();
    assert_eq!(queue.peek_command(), None);

    queue.push(Entry::new(opcodes::MTX_TRANS, 1));
    queue.push(Entry::new(opcodes::MTX_TRANS, 2));
    assert_eq!(queue.peek_command(), Some(opcodes::MTX_TRANS));

    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.staged(), 0);
}

#[test]
fn test_incomplete_command_waits() {
    let (mut gx, mut timing) = unscheduled();

    for i in 0..15 {
        gx.write32(&mut timing, regs::command_port(opcodes::MTX_LOAD_4X4), i)
            .unwrap();
    }
    assert_eq!(gx.queue().len(), 15);
    assert_eq!(gx.projection().current, Matrix::identity());
    assert!(gx.is_idle());

    gx.write32(&mut timing, regs::command_port(opcodes::MTX_LOAD_4X4), 15)
        .unwrap();
    assert!(gx.queue().is_empty());
    assert_eq!(gx.projection().current.field[3], [12, 13, 14, 15]);
}

#[test]
fn test_direct_write_to_unused_port_is_ignored() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::command_port(0x42), 0x1234).unwrap();
    gx.write32(&mut timing, regs::command_port(opcodes::NOP), 0).unwrap();
    assert!(gx.queue().is_empty());
}

#[test]
fn test_packed_command_with_parameter() {
    let (mut gx, mut timing) = unscheduled();

    // MTX_MODE, then MTX_IDENTITY
    gx.write32(&mut timing, regs::GXFIFO, 0x0000_1510).unwrap();
    assert_eq!(gx.queue().staged(), 0x1510);
    assert!(gx.queue().is_empty());

    gx.write32(&mut timing, regs::GXFIFO, 1).unwrap();
    assert_eq!(gx.matrix_mode(), MatrixMode::Modelview);
    assert_eq!(gx.queue().staged(), 0);
    assert!(gx.queue().is_empty());
}

#[test]
fn test_packed_leading_zero_parameter_command_runs_at_once() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::GXFIFO, opcodes::MTX_PUSH as u32)
        .unwrap();
    assert_eq!(gx.queue().staged(), 0);
    assert_eq!(gx.projection().pointer(), 1);
}

#[test]
fn test_packed_nop_bytes_are_skipped() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::GXFIFO, (opcodes::MTX_PUSH as u32) << 8)
        .unwrap();
    assert_eq!(gx.queue().staged(), 0);
    assert_eq!(gx.projection().pointer(), 1);
}

#[test]
fn test_packed_multi_parameter_sequence() {
    let (mut gx, mut timing) = unscheduled();

    // MTX_TRANS (3 params) then MTX_PUSH
    let packed = opcodes::MTX_TRANS as u32 | ((opcodes::MTX_PUSH as u32) << 8);
    gx.write32(&mut timing, regs::GXFIFO, packed).unwrap();
    gx.write32(&mut timing, regs::GXFIFO + 4, fx(1)).unwrap();
    gx.write32(&mut timing, regs::GXFIFO + 8, fx(2)).unwrap();
    assert_eq!(gx.queue().len(), 2);
    assert_eq!(gx.projection().pointer(), 0);

    gx.write32(&mut timing, regs::GXFIFO, fx(3)).unwrap();
    assert!(gx.queue().is_empty());
    assert_eq!(gx.queue().staged(), 0);
    assert_eq!(
        gx.projection().slot(0).map(|m| m.field[3]),
        Some([ONE, 2 * ONE, 3 * ONE, ONE])
    );
    assert_eq!(gx.projection().pointer(), 1);
}

#[test]
fn test_packed_and_direct_writes_match() {
    let (mut packed, mut packed_timing) = unscheduled();
    let (mut direct, mut direct_timing) = unscheduled();

    packed
        .write32(&mut packed_timing, regs::GXFIFO, opcodes::MTX_SCALE as u32)
        .unwrap();
    for p in [fx(2), fx(3), fx(4)] {
        packed.write32(&mut packed_timing, regs::GXFIFO, p).unwrap();
    }

    send(&mut direct, &mut direct_timing, opcodes::MTX_SCALE, &[fx(2), fx(3), fx(4)]);

    assert_eq!(packed.projection().current, direct.projection().current);
    assert_eq!(packed.clip_matrix(), direct.clip_matrix());
}

#[test]
fn test_all_zero_packed_write_stages_nothing() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::GXFIFO, 0).unwrap();
    assert_eq!(gx.queue().staged(), 0);
    assert!(gx.queue().is_empty());
}

proptest! {
    #[test]
    fn prop_queue_preserves_order_and_count(params in prop::collection::vec(any::<u32>(), 0..300)) {
        let mut queue = CommandQueue::new();
        for &p in &params {
            queue.push(Entry::new(opcodes::COLOR, p));
            prop_assert!(queue.pipe_len() <= PIPE_CAPACITY);
        }
        prop_assert_eq!(queue.len(), params.len());

        let mut drained = Vec::new();
        while let Some(entry) = queue.pop() {
            drained.push(entry.parameter);
            prop_assert!(queue.pipe_len() <= PIPE_CAPACITY);
        }
        prop_assert_eq!(drained, params);
        prop_assert!(queue.is_empty());
    }
}
