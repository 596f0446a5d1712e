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

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};

use dsrx::core::save_state::SaveState;
use dsrx::core::script::DEFAULT_IDLE_LIMIT;
use dsrx::core::{Config, Script, System};

/// Nintendo DS 3D geometry engine
#[derive(Parser)]
#[command(name = "dsrx")]
#[command(about = "Replay register scripts against the NDS geometry engine", long_about = None)]
struct Args {
    /// Path to a TOML register script
    script: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Reject unknown commands and unsupported texture modes
    #[arg(long)]
    strict: bool,

    /// Restore this save state before replaying
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save state after replaying
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Write the published render buffers as JSON
    #[arg(short = 'd', long)]
    dump: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env for DSRX_* overrides and RUST_LOG
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("dsrx v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides()?;
    if args.strict {
        config.geometry.strict_commands = true;
    }

    let mut system = System::with_config(config);

    if let Some(path) = &args.load_state {
        info!("Loading save state from: {}", path.display());
        let state = SaveState::load_from_file(path)?;
        system.load_state(&state)?;
    }

    let script = Script::load(&args.script)?;

    let report = match system.run_script(&script) {
        Ok(report) => report,
        Err(e) => {
            error!("Script failed: {}", e);
            return Err(Box::new(e));
        }
    };

    system.run_until_idle(DEFAULT_IDLE_LIMIT)?;

    let render = system.gx().render_buffers();
    info!(
        "Frame {}: {} vertices, {} polygons published",
        render.frame,
        render.vertices.len(),
        render.polygons.len()
    );
    info!(
        "Building: {} vertices, {} polygons | Ticks: {}",
        system.gx().vertex_ram().len(),
        system.gx().polygon_ram().len(),
        system.ticks()
    );

    if let Some(path) = &args.dump {
        let json = serde_json::to_string_pretty(render)?;
        std::fs::write(path, json)?;
        info!("Render buffers written to {}", path.display());
    }

    if let Some(path) = &args.save_state {
        system.save_state().save_to_file(path)?;
    }

    let mismatches = report.mismatches().count();
    if mismatches > 0 {
        for read in report.mismatches() {
            warn!(
                "Mismatch at 0x{:08X}: got 0x{:08X}, expected 0x{:08X}",
                read.addr,
                read.value,
                read.expect.unwrap_or_default()
            );
        }
        error!("{} of {} reads mismatched", mismatches, report.reads.len());
        std::process::exit(1);
    }

    info!("Script completed successfully ({} ops)", report.ops);
    Ok(())
}
