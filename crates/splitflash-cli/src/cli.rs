use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "splitflash")]
#[command(bin_name = "splitflash")]
#[command(version)]
#[command(about = "Build and flash split-keyboard firmware onto a UF2 bootloader")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Write a debug log under ~/.config/splitflash/diagnostics"
    )]
    pub diagnostics: bool,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Directory holding the build script and firmware/ (default: auto-detect)"
    )]
    pub base_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Mount path of the bootloader volume"
    )]
    pub volume: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Run environment and configuration checks")]
    Doctor,
    #[command(about = "List firmware builds without starting the TUI")]
    List,
}
