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

//! Register access tests
//! Tests for GXSTAT, RAM_COUNT, result registers and rasterizer control

use super::super::*;
use super::{fx, send, settle, setup, unscheduled, vtx16};
use crate::core::error::EmulatorError;

#[test]
fn test_gxstat_power_on() {
    let gx = GeometryEngine::new();
    let stat = GxStat::from_bits_truncate(gx.read_gxstat());

    assert_eq!(stat, GxStat::FIFO_LESS_THAN_HALF | GxStat::FIFO_EMPTY);
    assert_eq!(gx.read_gxstat() >> 30, 0);
}

#[test]
fn test_gxstat_busy_and_fifo_level() {
    let (mut gx, mut timing) = setup();

    send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    let stat = GxStat::from_bits_truncate(gx.read_gxstat());
    assert!(stat.contains(GxStat::BUSY));

    for _ in 0..(PIPE_CAPACITY + 200) {
        send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    }
    let value = gx.read_gxstat();
    assert_eq!((value >> 16) & 0x1FF, 200);
    let stat = GxStat::from_bits_truncate(value);
    assert!(!stat.contains(GxStat::FIFO_LESS_THAN_HALF));
    assert!(!stat.contains(GxStat::FIFO_EMPTY));
    assert!(!stat.contains(GxStat::FIFO_FULL));

    settle(&mut gx, &mut timing);
    assert!(!GxStat::from_bits_truncate(gx.read_gxstat()).contains(GxStat::BUSY));
}

#[test]
fn test_gxstat_busy_while_parameters_pending() {
    let (mut gx, mut timing) = setup();

    send(&mut gx, &mut timing, opcodes::MTX_TRANS, &[0]);
    assert!(!gx.is_busy());
    let stat = GxStat::from_bits_truncate(gx.read_gxstat());
    assert!(stat.contains(GxStat::BUSY));
}

#[test]
fn test_gxstat_stack_pointers() {
    let (mut gx, mut timing) = unscheduled();

    send(&mut gx, &mut timing, opcodes::MTX_MODE, &[1]);
    for _ in 0..3 {
        send(&mut gx, &mut timing, opcodes::MTX_PUSH, &[]);
    }
    assert_eq!((gx.read_gxstat() >> 8) & 0x1F, 3);
    assert_eq!((gx.read_gxstat() >> 13) & 1, 0);
}

#[test]
fn test_fifo_irq_less_than_half() {
    let (mut gx, mut timing) = unscheduled();
    assert!(!gx.poll_interrupt());

    gx.write32(&mut timing, regs::GXSTAT, 1 << 30).unwrap();
    assert_eq!(gx.irq_mode(), FifoIrqMode::LessThanHalf);
    assert_eq!(gx.read_gxstat() >> 30, 1);

    assert!(gx.poll_interrupt());
    assert!(!gx.poll_interrupt());

    // Raised again as commands drain
    send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    assert!(gx.poll_interrupt());
}

#[test]
fn test_fifo_irq_empty_waits_for_drain() {
    let (mut gx, mut timing) = setup();

    send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    for _ in 0..(PIPE_CAPACITY + 10) {
        send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    }

    gx.write32(&mut timing, regs::GXSTAT, 2 << 30).unwrap();
    assert!(!gx.poll_interrupt());

    settle(&mut gx, &mut timing);
    assert!(gx.poll_interrupt());
}

#[test]
fn test_fifo_irq_never() {
    let (mut gx, mut timing) = unscheduled();

    send(&mut gx, &mut timing, opcodes::MTX_IDENTITY, &[]);
    assert!(!gx.poll_interrupt());
}

#[test]
fn test_gxstat_write16_halves() {
    let (mut gx, mut timing) = unscheduled();

    gx.write16(&mut timing, regs::GXSTAT + 2, 0x8000).unwrap();
    assert_eq!(gx.irq_mode(), FifoIrqMode::Empty);

    // Low half keeps the interrupt mode
    gx.write16(&mut timing, regs::GXSTAT, 0x8000).unwrap();
    assert_eq!(gx.irq_mode(), FifoIrqMode::Empty);
    assert_eq!(gx.read16(regs::GXSTAT + 2).unwrap() >> 14, 2);
}

#[test]
fn test_ram_count() {
    let (mut gx, mut timing) = unscheduled();

    send(&mut gx, &mut timing, opcodes::BEGIN_VTXS, &[PolygonType::Quad as u32]);
    for _ in 0..5 {
        send(&mut gx, &mut timing, opcodes::VTX_16, &vtx16(0, 0, 0));
    }
    assert_eq!(gx.read32(regs::RAM_COUNT).unwrap(), 1 | (5 << 16));
}

#[test]
fn test_position_test_result() {
    let (mut gx, mut timing) = unscheduled();
    send(&mut gx, &mut timing, opcodes::MTX_TRANS, &[fx(1), 0, 0]);

    send(&mut gx, &mut timing, opcodes::POS_TEST, &vtx16(0x1000, 0x800, -0x1000));
    assert_eq!(gx.position_result(), [2 * ONE, 0x800, -ONE, ONE]);

    assert_eq!(gx.read32(regs::POS_RESULT).unwrap(), (2 * ONE) as u32);
    assert_eq!(gx.read32(regs::POS_RESULT + 4).unwrap(), 0x800);
    assert_eq!(gx.read32(regs::POS_RESULT + 8).unwrap(), (-ONE) as u32);
    assert_eq!(gx.read32(regs::POS_RESULT + 12).unwrap(), ONE as u32);

    // The tested point becomes the current vertex position
    assert_eq!(gx.current_vertex().x, 0x1000);
    assert_eq!(gx.current_vertex().z, -0x1000);
}

#[test]
fn test_vector_test_result() {
    let (mut gx, mut timing) = unscheduled();

    // x = 0.5, y = -0.5 (1.9), z = 0
    send(&mut gx, &mut timing, opcodes::VEC_TEST, &[0x100 | (0x300 << 10)]);
    assert_eq!(gx.vector_result(), [0x800, -0x800, 0]);

    assert_eq!(gx.read32(regs::VEC_RESULT).unwrap(), 0xF800_0800);
    assert_eq!(gx.read32(regs::VEC_RESULT + 4).unwrap(), 0);
    assert_eq!(gx.read16(regs::VEC_RESULT + 2).unwrap(), 0xF800);
}

#[test]
fn test_vector_test_uses_direction_matrix() {
    let (mut gx, mut timing) = unscheduled();
    send(&mut gx, &mut timing, opcodes::MTX_MODE, &[2]);
    send(&mut gx, &mut timing, opcodes::MTX_MULT_3X3, &[
        0, fx(1), 0,
        fx(1), 0, 0,
        0, 0, fx(1),
    ]);

    send(&mut gx, &mut timing, opcodes::VEC_TEST, &[0x100]);
    assert_eq!(gx.vector_result(), [0, 0x800, 0]);
}

#[test]
fn test_clip_matrix_result() {
    let (mut gx, mut timing) = unscheduled();
    send(&mut gx, &mut timing, opcodes::MTX_TRANS, &[fx(3), 0, 0]);

    assert_eq!(gx.read32(regs::CLIPMTX_RESULT).unwrap(), ONE as u32);
    assert_eq!(gx.read32(regs::CLIPMTX_RESULT + 4).unwrap(), 0);
    assert_eq!(gx.read32(regs::CLIPMTX_RESULT + 48).unwrap(), fx(3));
    assert_eq!(gx.read32(regs::CLIPMTX_RESULT + 60).unwrap(), ONE as u32);
}

#[test]
fn test_direction_matrix_result() {
    let (mut gx, mut timing) = unscheduled();
    send(&mut gx, &mut timing, opcodes::MTX_MODE, &[2]);
    send(&mut gx, &mut timing, opcodes::MTX_MULT_3X3, &[
        fx(1), fx(2), fx(3),
        fx(4), fx(5), fx(6),
        fx(7), fx(8), fx(9),
    ]);

    // 3x3, row-major
    assert_eq!(gx.read32(regs::VECMTX_RESULT).unwrap(), fx(1));
    assert_eq!(gx.read32(regs::VECMTX_RESULT + 4 * 4).unwrap(), fx(5));
    assert_eq!(gx.read32(regs::VECMTX_RESULT + 8 * 4).unwrap(), fx(9));
}

#[test]
fn test_command_range_reads_zero() {
    let gx = GeometryEngine::new();
    assert_eq!(gx.read32(regs::GXFIFO).unwrap(), 0);
    assert_eq!(gx.read32(regs::command_port(opcodes::VTX_16)).unwrap(), 0);
}

#[test]
fn test_top_of_address_space_is_unmapped() {
    let (mut gx, mut timing) = unscheduled();

    for address in [0xFFFF_FFFC, 0xFFFF_FFFD, 0xFFFF_FFFF] {
        assert!(matches!(
            gx.write32(&mut timing, address, 0x1234_5678),
            Err(EmulatorError::InvalidMemoryAccess { .. })
        ));
        assert!(matches!(
            gx.read32(address),
            Err(EmulatorError::InvalidMemoryAccess { .. })
        ));
    }
    assert!(matches!(
        gx.write16(&mut timing, 0xFFFF_FFFF, 0xABCD),
        Err(EmulatorError::InvalidMemoryAccess { .. })
    ));
    assert!(matches!(
        gx.read16(0xFFFF_FFFE),
        Err(EmulatorError::InvalidMemoryAccess { .. })
    ));
    assert_eq!(gx.render_control(), &RenderControl::default());
}

#[test]
fn test_read_only_writes_are_ignored() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::RAM_COUNT, 0xFFFF_FFFF).unwrap();
    gx.write32(&mut timing, regs::CLIPMTX_RESULT, 0).unwrap();
    assert_eq!(gx.read32(regs::RAM_COUNT).unwrap(), 0);
    assert_eq!(gx.clip_matrix(), &Matrix::identity());
}

#[test]
fn test_16bit_command_write_is_ignored() {
    let (mut gx, mut timing) = unscheduled();

    gx.write16(&mut timing, regs::command_port(opcodes::MTX_PUSH), 0).unwrap();
    gx.write16(&mut timing, regs::GXFIFO, 0x11).unwrap();
    assert!(gx.queue().is_empty());
    assert_eq!(gx.queue().staged(), 0);
}

#[test]
fn test_render_control_registers() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::CLEAR_COLOR, 0x3F1F_7FFF).unwrap();
    gx.write16(&mut timing, regs::DISP3DCNT, 0x0003).unwrap();
    gx.write32(&mut timing, regs::EDGE_COLOR + 4, 0x001F_03E0).unwrap();
    gx.write16(&mut timing, regs::TOON_TABLE + 62, 0x7C00).unwrap();
    gx.write32(&mut timing, regs::FOG_TABLE + 28, 0x7F40_2010).unwrap();
    gx.write16(&mut timing, regs::DISP_1DOT_DEPTH, 0x7FFF).unwrap();

    let control = gx.render_control();
    assert_eq!(control.clear_colour, 0x3F1F_7FFF);
    assert_eq!(control.disp3dcnt, 0x0003);
    assert_eq!(control.edge_colours[2], 0x03E0);
    assert_eq!(control.edge_colours[3], 0x001F);
    assert_eq!(control.toon_table[31], 0x7C00);
    assert_eq!(control.fog_table[31], 0x7F);
    assert_eq!(control.disp_1dot_depth, 0x7FFF);

    assert_eq!(gx.read32(regs::CLEAR_COLOR).unwrap(), 0x3F1F_7FFF);
    assert_eq!(gx.read16(regs::CLEAR_DEPTH).unwrap(), 0);
    assert_eq!(gx.read32(regs::FOG_TABLE + 28).unwrap(), 0x7F40_2010);
}

#[test]
fn test_alpha_and_fog_registers() {
    let (mut gx, mut timing) = unscheduled();

    gx.write32(&mut timing, regs::CLEAR_DEPTH, 0x0012_7FFF).unwrap();
    gx.write32(&mut timing, regs::FOG_COLOR, 0x001F_7FFF).unwrap();
    gx.write16(&mut timing, regs::FOG_OFFSET, 0x1234).unwrap();
    gx.write16(&mut timing, regs::ALPHA_TEST_REF, 0x001F).unwrap();

    let control = gx.render_control();
    assert_eq!(control.clear_depth, 0x7FFF);
    assert_eq!(control.clrimage_offset, 0x0012);
    assert_eq!(control.fog_colour, 0x001F_7FFF);
    assert_eq!(control.fog_offset, 0x1234);
    assert_eq!(control.alpha_test_ref, 0x1F);
}

#[test]
fn test_unmapped_address() {
    let (mut gx, mut timing) = unscheduled();

    assert!(!GeometryEngine::handles(0x0400_0000));
    assert!(GeometryEngine::handles(regs::GXSTAT));
    assert!(GeometryEngine::handles(regs::DISP3DCNT));

    assert!(matches!(
        gx.write32(&mut timing, 0x0400_0700, 0),
        Err(EmulatorError::InvalidMemoryAccess { address: 0x0400_0700 })
    ));
    assert!(matches!(
        gx.read32(0x0400_0608),
        Err(EmulatorError::InvalidMemoryAccess { .. })
    ));
}
