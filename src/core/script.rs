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

//! Register-level command scripts
//!
//! A script is a TOML list of bus operations replayed against a
//! [`System`](crate::core::System). It stands in for the ARM9 driving the
//! geometry engine.
//!
//! ```toml
//! # MTX_IDENTITY, then read GXSTAT
//! [[ops]]
//! op = "write32"
//! addr = 0x04000454
//! value = 0
//!
//! [[ops]]
//! op = "idle"
//!
//! [[ops]]
//! op = "read32"
//! addr = 0x04000600
//! expect = 0x06000000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{EmulatorError, Result};
use super::timing::TickCount;

/// Tick limit for `idle` when none is given
pub const DEFAULT_IDLE_LIMIT: u64 = 1_000_000;

/// One script operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Write32 {
        addr: u32,
        value: u32,
    },
    Write16 {
        addr: u32,
        value: u16,
    },
    /// Read a word, optionally checking it
    Read32 {
        addr: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<u32>,
    },
    /// Advance the scheduler
    Run { ticks: TickCount },
    /// Run until the geometry engine has nothing left to do
    Idle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_ticks: Option<u64>,
    },
}

/// Ordered list of operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub ops: Vec<Op>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a script from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| EmulatorError::Script(format!("Failed to parse script: {}", e)))
    }

    /// Load a script from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EmulatorError::Script(format!("Failed to read script {}: {}", path.display(), e))
        })?;
        let script = Self::from_toml_str(&contents)?;
        log::info!("Loaded script {} ({} ops)", path.display(), script.ops.len());
        Ok(script)
    }

    /// Render the script as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| EmulatorError::Script(format!("Failed to serialize script: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    // Builder helpers

    pub fn write32(mut self, addr: u32, value: u32) -> Self {
        self.push(Op::Write32 { addr, value });
        self
    }

    pub fn write16(mut self, addr: u32, value: u16) -> Self {
        self.push(Op::Write16 { addr, value });
        self
    }

    pub fn read32(mut self, addr: u32, expect: Option<u32>) -> Self {
        self.push(Op::Read32 { addr, expect });
        self
    }

    pub fn run(mut self, ticks: TickCount) -> Self {
        self.push(Op::Run { ticks });
        self
    }

    pub fn idle(mut self) -> Self {
        self.push(Op::Idle { max_ticks: None });
        self
    }
}

/// One `read32` outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub addr: u32,
    pub value: u32,
    pub expect: Option<u32>,
}

impl ReadResult {
    /// True when there was no expectation or it was met
    pub fn matches(&self) -> bool {
        self.expect.is_none_or(|expect| expect == self.value)
    }
}

/// Outcome of replaying a script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    /// Operations executed
    pub ops: usize,
    /// Scheduler ticks consumed by `run` and `idle`
    pub ticks: u64,
    pub reads: Vec<ReadResult>,
}

impl ScriptReport {
    /// Reads whose value differed from `expect`
    pub fn mismatches(&self) -> impl Iterator<Item = &ReadResult> {
        self.reads.iter().filter(|read| !read.matches())
    }

    pub fn passed(&self) -> bool {
        self.mismatches().next().is_none()
    }
}
