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

//! Geometry command opcodes
//!
//! Opcode numbers, the per-opcode parameter counts and a few bit-field
//! helpers shared by the command handlers.
//!
//! # References
//!
//! - [GBATEK: DS 3D Geometry Commands](https://problemkaputt.de/gbatek.htm#ds3dgeometrycommands)

/// Geometry command opcodes
pub mod opcodes {
    pub const NOP: u8 = 0x00;

    pub const MTX_MODE: u8 = 0x10;
    pub const MTX_PUSH: u8 = 0x11;
    pub const MTX_POP: u8 = 0x12;
    pub const MTX_STORE: u8 = 0x13;
    pub const MTX_RESTORE: u8 = 0x14;
    pub const MTX_IDENTITY: u8 = 0x15;
    pub const MTX_LOAD_4X4: u8 = 0x16;
    pub const MTX_LOAD_4X3: u8 = 0x17;
    pub const MTX_MULT_4X4: u8 = 0x18;
    pub const MTX_MULT_4X3: u8 = 0x19;
    pub const MTX_MULT_3X3: u8 = 0x1A;
    pub const MTX_SCALE: u8 = 0x1B;
    pub const MTX_TRANS: u8 = 0x1C;

    pub const COLOR: u8 = 0x20;
    pub const NORMAL: u8 = 0x21;
    pub const TEXCOORD: u8 = 0x22;
    pub const VTX_16: u8 = 0x23;
    pub const VTX_10: u8 = 0x24;
    pub const VTX_XY: u8 = 0x25;
    pub const VTX_XZ: u8 = 0x26;
    pub const VTX_YZ: u8 = 0x27;
    pub const VTX_DIFF: u8 = 0x28;
    pub const POLYGON_ATTR: u8 = 0x29;
    pub const TEXIMAGE_PARAM: u8 = 0x2A;
    pub const PLTT_BASE: u8 = 0x2B;

    pub const DIF_AMB: u8 = 0x30;
    pub const SPE_EMI: u8 = 0x31;
    pub const LIGHT_VECTOR: u8 = 0x32;
    pub const LIGHT_COLOR: u8 = 0x33;
    pub const SHININESS: u8 = 0x34;

    pub const BEGIN_VTXS: u8 = 0x40;
    pub const END_VTXS: u8 = 0x41;

    pub const SWAP_BUFFERS: u8 = 0x50;

    pub const VIEWPORT: u8 = 0x60;

    pub const BOX_TEST: u8 = 0x70;
    pub const POS_TEST: u8 = 0x71;
    pub const VEC_TEST: u8 = 0x72;
}

use opcodes::*;

/// Parameter count for each 7-bit opcode
///
/// Opcodes not listed here take no parameters and have no handler.
pub static PARAMETER_COUNTS: [u8; 128] = build_parameter_counts();

const fn build_parameter_counts() -> [u8; 128] {
    let mut table = [0u8; 128];

    table[MTX_MODE as usize] = 1;
    table[MTX_POP as usize] = 1;
    table[MTX_STORE as usize] = 1;
    table[MTX_RESTORE as usize] = 1;
    table[MTX_LOAD_4X4 as usize] = 16;
    table[MTX_LOAD_4X3 as usize] = 12;
    table[MTX_MULT_4X4 as usize] = 16;
    table[MTX_MULT_4X3 as usize] = 12;
    table[MTX_MULT_3X3 as usize] = 9;
    table[MTX_SCALE as usize] = 3;
    table[MTX_TRANS as usize] = 3;

    table[COLOR as usize] = 1;
    table[NORMAL as usize] = 1;
    table[TEXCOORD as usize] = 1;
    table[VTX_16 as usize] = 2;
    table[VTX_10 as usize] = 1;
    table[VTX_XY as usize] = 1;
    table[VTX_XZ as usize] = 1;
    table[VTX_YZ as usize] = 1;
    table[VTX_DIFF as usize] = 1;
    table[POLYGON_ATTR as usize] = 1;
    table[TEXIMAGE_PARAM as usize] = 1;
    table[PLTT_BASE as usize] = 1;

    table[DIF_AMB as usize] = 1;
    table[SPE_EMI as usize] = 1;
    table[LIGHT_VECTOR as usize] = 1;
    table[LIGHT_COLOR as usize] = 1;
    table[SHININESS as usize] = 32;

    table[BEGIN_VTXS as usize] = 1;

    table[SWAP_BUFFERS as usize] = 1;
    table[VIEWPORT as usize] = 1;

    table[BOX_TEST as usize] = 3;
    table[POS_TEST as usize] = 2;
    table[VEC_TEST as usize] = 1;

    table
}

/// Number of parameter words `command` consumes
#[inline]
pub fn parameter_count(command: u8) -> usize {
    PARAMETER_COUNTS[(command & 0x7F) as usize] as usize
}

/// Number of queue entries a command occupies
///
/// The command's own entry carries its first parameter, so a command with
/// no parameters still needs one entry.
#[inline]
pub fn entry_count(command: u8) -> usize {
    parameter_count(command).max(1)
}

/// Whether `command` has a handler
pub fn is_valid(command: u8) -> bool {
    command == NOP || name(command) != "UNKNOWN"
}

/// Mnemonic for logging
pub fn name(command: u8) -> &'static str {
    match command {
        NOP => "NOP",
        MTX_MODE => "MTX_MODE",
        MTX_PUSH => "MTX_PUSH",
        MTX_POP => "MTX_POP",
        MTX_STORE => "MTX_STORE",
        MTX_RESTORE => "MTX_RESTORE",
        MTX_IDENTITY => "MTX_IDENTITY",
        MTX_LOAD_4X4 => "MTX_LOAD_4x4",
        MTX_LOAD_4X3 => "MTX_LOAD_4x3",
        MTX_MULT_4X4 => "MTX_MULT_4x4",
        MTX_MULT_4X3 => "MTX_MULT_4x3",
        MTX_MULT_3X3 => "MTX_MULT_3x3",
        MTX_SCALE => "MTX_SCALE",
        MTX_TRANS => "MTX_TRANS",
        COLOR => "COLOR",
        NORMAL => "NORMAL",
        TEXCOORD => "TEXCOORD",
        VTX_16 => "VTX_16",
        VTX_10 => "VTX_10",
        VTX_XY => "VTX_XY",
        VTX_XZ => "VTX_XZ",
        VTX_YZ => "VTX_YZ",
        VTX_DIFF => "VTX_DIFF",
        POLYGON_ATTR => "POLYGON_ATTR",
        TEXIMAGE_PARAM => "TEXIMAGE_PARAM",
        PLTT_BASE => "PLTT_BASE",
        DIF_AMB => "DIF_AMB",
        SPE_EMI => "SPE_EMI",
        LIGHT_VECTOR => "LIGHT_VECTOR",
        LIGHT_COLOR => "LIGHT_COLOR",
        SHININESS => "SHININESS",
        BEGIN_VTXS => "BEGIN_VTXS",
        END_VTXS => "END_VTXS",
        SWAP_BUFFERS => "SWAP_BUFFERS",
        VIEWPORT => "VIEWPORT",
        BOX_TEST => "BOX_TEST",
        POS_TEST => "POS_TEST",
        VEC_TEST => "VEC_TEST",
        _ => "UNKNOWN",
    }
}

/// Sign-extend the low `bits` bits of `value`
///
/// # Examples
///
/// ```
/// use dsrx::core::gx::sign_extend;
///
/// assert_eq!(sign_extend(0x3FF, 10), -1);
/// assert_eq!(sign_extend(0x1FF, 10), 511);
/// assert_eq!(sign_extend(0x20, 6), -32);
/// ```
#[inline]
pub fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Split a parameter word into its low and high signed 16-bit halves
#[inline]
pub fn split_i16(value: u32) -> (i16, i16) {
    (value as i16, (value >> 16) as i16)
}

/// Unpack three signed 10-bit fields at bits 0, 10 and 20
#[inline]
pub fn unpack_10bit(value: u32) -> [i32; 3] {
    [
        sign_extend(value & 0x3FF, 10),
        sign_extend((value >> 10) & 0x3FF, 10),
        sign_extend((value >> 20) & 0x3FF, 10),
    ]
}
