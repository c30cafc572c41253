use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const EXTENSION_CRATE: &str = "spindle-extension";
const EXTENSION_DIR: &str = "extension";
const DIST_DIR: &str = "dist";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Spindle extension task runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the background worker to wasm (wasm-pack, no-modules target)
    Build {
        /// Unoptimized debug build
        #[arg(long)]
        dev: bool,
    },

    /// Build and assemble an unpacked extension in dist/
    Package {
        /// Unoptimized debug build
        #[arg(long)]
        dev: bool,
    },

    /// Run the extension's unit tests
    Test,

    /// Run clippy linter
    Clippy,

    /// Remove dist/
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { dev } => build(dev),
        Commands::Package { dev } => package(dev),
        Commands::Test => test(),
        Commands::Clippy => clippy(),
        Commands::Clean => clean(),
    }
}

fn build(dev: bool) -> Result<()> {
    println!("🔨 Building background worker...");

    let out_dir = Path::new("..").join(DIST_DIR).join("pkg");
    let out_dir = out_dir.to_string_lossy();
    let profile = if dev { "--dev" } else { "--release" };

    run_cmd(
        "wasm-pack",
        &[
            "build",
            EXTENSION_DIR,
            profile,
            "--target",
            "no-modules",
            "--out-dir",
            &out_dir,
            "--no-typescript",
        ],
    )?;
    Ok(())
}

fn package(dev: bool) -> Result<()> {
    build(dev)?;

    println!("📦 Assembling {}/...", DIST_DIR);
    let static_dir = PathBuf::from(EXTENSION_DIR).join("static");
    let entries = fs::read_dir(&static_dir)
        .with_context(|| format!("Failed to read {}", static_dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = Path::new(DIST_DIR).join(name);
        fs::copy(&path, &target)
            .with_context(|| format!("Failed to copy {} to {}", path.display(), target.display()))?;
        println!("  ✅ {}", target.display());
    }

    // wasm-pack drops a .gitignore and package.json we don't ship
    let pkg = Path::new(DIST_DIR).join("pkg");
    for extra in [".gitignore", "package.json"] {
        let _ = fs::remove_file(pkg.join(extra));
    }

    println!();
    println!("✅ Load {}/ as an unpacked extension", DIST_DIR);
    Ok(())
}

fn test() -> Result<()> {
    println!("🧪 Running extension tests...");
    run_cmd("cargo", &["test", "-p", EXTENSION_CRATE])?;
    Ok(())
}

fn clippy() -> Result<()> {
    println!("🔍 Running clippy on workspace (warnings as errors)...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )?;
    Ok(())
}

fn clean() -> Result<()> {
    println!("🧹 Removing {}/...", DIST_DIR);
    // Ignore error if it was never built
    let _ = fs::remove_dir_all(DIST_DIR);
    Ok(())
}

// Helper functions
fn run_cmd(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", program, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", program, args.join(" "));
    }

    Ok(())
}
