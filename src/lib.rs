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

//! Nintendo DS 3D geometry engine library
//!
//! This library emulates the ARM9-side geometry engine of the Nintendo DS:
//! the GXFIFO command processor, the fixed-point matrix pipeline and the
//! vertex and polygon assembly that feeds the rasterizer.
//!
//! # Example
//!
//! ```
//! use dsrx::core::gx::{opcodes, regs};
//! use dsrx::core::System;
//!
//! let mut system = System::new();
//!
//! // BEGIN_VTXS(triangles), three vertices, END_VTXS
//! system.write32(regs::command_port(opcodes::BEGIN_VTXS), 0).unwrap();
//! for xy in [0x0000_0000, 0x0000_0800, 0x0000_1000] {
//!     system.write32(regs::command_port(opcodes::VTX_16), xy).unwrap();
//!     system.write32(regs::command_port(opcodes::VTX_16), 0).unwrap();
//! }
//! system.write32(regs::command_port(opcodes::END_VTXS), 0).unwrap();
//! system.run_until_idle(1000).unwrap();
//!
//! assert_eq!(system.gx().polygon_ram().len(), 1);
//! ```

pub mod core;
