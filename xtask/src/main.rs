use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for dsrx", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only geometry engine tests
        #[arg(long)]
        gx: bool,
        /// Run only System module tests
        #[arg(long)]
        system: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Run benchmarks
    Bench,
    /// Replay a register script through the dsrx binary
    Replay {
        /// Path to the TOML script
        script: PathBuf,
        /// Write the published render buffers as JSON
        #[arg(short = 'd', long)]
        dump: Option<PathBuf>,
        /// Reject unknown commands
        #[arg(long)]
        strict: bool,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            gx,
            system,
            integration,
        } => run_test(doc, ignored, TestScope::new(gx, system, integration)),
        Commands::Bench => run_bench(),
        Commands::Replay {
            script,
            dump,
            strict,
            release,
        } => run_replay(&script, dump.as_deref(), strict, release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

/// Test selection for `cargo x test`
#[derive(Default)]
struct TestScope {
    gx: bool,
    system: bool,
    integration: bool,
}

impl TestScope {
    fn new(gx: bool, system: bool, integration: bool) -> Self {
        Self {
            gx,
            system,
            integration,
        }
    }

    fn is_all(&self) -> bool {
        !(self.gx || self.system || self.integration)
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task(
        "Test",
        || run_test(false, false, TestScope::default()),
        verbose,
    )?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--all-targets").arg("--all-features");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, scope: TestScope) -> Result<()> {
    if doc || scope.is_all() {
        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features");
        if doc {
            cmd.arg("--doc");
        }
        if ignored {
            cmd.arg("--").arg("--ignored");
        }
        return execute_command(&mut cmd);
    }

    let suites: [(bool, &[&str], &str); 3] = [
        (scope.gx, &["--lib", "core::gx"], "Geometry engine"),
        (scope.system, &["--lib", "core::system"], "System"),
        (scope.integration, &["--test", "integration_test"], "Integration"),
    ];
    let requested = suites.iter().filter(|(enabled, _, _)| *enabled).count();

    let mut failed = Vec::new();

    for (enabled, args, name) in suites {
        if !enabled {
            continue;
        }

        println!("{} Running {} tests...", "→".blue(), name.bold());

        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("--all-features").args(args);
        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        match execute_command(&mut cmd) {
            Ok(()) => println!("{} {} tests passed\n", "✓".green(), name),
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), name);
                if requested == 1 {
                    return Err(e);
                }
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Test suites failed: {}", failed.join(", "))
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_replay(script: &Path, dump: Option<&Path>, strict: bool, release: bool) -> Result<()> {
    println!("{}", "=== Script Replay ===".bold().blue());

    if !script.exists() {
        println!(
            "{} Script not found: {}",
            "✗".red().bold(),
            script.display().to_string().yellow()
        );
        anyhow::bail!("Script file not found: {}", script.display());
    }

    println!("{} Script: {}", "→".blue(), script.display().to_string().bold());

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("dsrx");
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--").arg(script);
    if let Some(dump) = dump {
        cmd.arg("--dump").arg(dump);
    }
    if strict {
        cmd.arg("--strict");
    }

    let start = Instant::now();
    let result = execute_command(&mut cmd);
    let elapsed = start.elapsed();

    match result {
        Ok(()) => {
            println!(
                "\n{} {}",
                "✓ Replay finished in".green().bold(),
                format!("{:.2}s", elapsed.as_secs_f64()).bold()
            );
            if let Some(dump) = dump {
                println!("  Render buffers: {}", dump.display());
            }
            Ok(())
        }
        Err(e) => {
            println!("\n{}", "✗ Replay failed".red().bold());
            Err(e)
        }
    }
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task(
        "Test",
        || run_test(false, false, TestScope::default()),
        false,
    )?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(()) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
