//! Development tasks for termreel.
//!
//! Usage: `cargo xtask man [--out-dir DIR]`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "termreel development tasks")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages for termreel and its subcommands
    Man {
        /// Output directory
        #[arg(long, default_value = "target/man")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().task {
        Task::Man { out_dir } => generate_man_pages(&out_dir),
    }
}

fn generate_man_pages(out_dir: &std::path::Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = termreel::cli::Cli::command();
    write_page(out_dir, "termreel", cmd.clone())?;
    for sub in cmd.get_subcommands() {
        let name = format!("termreel-{}", sub.get_name());
        write_page(out_dir, &name, sub.clone())?;
    }
    println!("Man pages written to {}", out_dir.display());
    Ok(())
}

fn write_page(out_dir: &std::path::Path, name: &str, cmd: clap::Command) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page for {}", name))?;
    let path = out_dir.join(format!("{}.1", name));
    fs::write(&path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
