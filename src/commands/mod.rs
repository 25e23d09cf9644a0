use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dvpk_archive::archive::Archive;

mod describe;
#[cfg(feature = "dump")]
mod dump;
mod extract;
mod list;
mod unpack_dir;
mod utils;
mod verify;

#[derive(Parser)]
#[command(name = "dvpk tool", author, version, arg_required_else_help = true)]
pub struct Commands {
    #[command(subcommand)]
    pub operation: Operation,
}

impl Commands {
    /// handle the user command
    pub fn start(self) -> anyhow::Result<()> {
        match self.operation {
            #[cfg(feature = "dump")]
            Operation::Dump(commands) => {
                let archive = load_archive(&commands.input)?;
                commands.start(archive)
            }
            Operation::List(commands) => {
                let archive = load_archive(&commands.input)?;
                commands.start(archive)
            }
            Operation::Extract(commands) => {
                let archive = load_archive(&commands.input)?;
                commands.start(archive)
            }
            Operation::Describe(commands) => {
                let archive = load_archive(&commands.input)?;
                commands.start(archive)
            }
            Operation::Verify(commands) => {
                let archive = load_archive(&commands.input)?;
                commands.start(archive)
            }
            Operation::UnpackDir(commands) => commands.start(),
        }
    }
}

#[derive(Subcommand)]
pub enum Operation {
    /// dump raw archive structures as json
    #[cfg(feature = "dump")]
    Dump(dump::Commands),
    /// list files inside an archive
    List(list::Commands),
    /// extract files from an archive
    Extract(extract::Commands),
    /// print a text description of the archive, including packs and dependencies
    Describe(describe::Commands),
    /// check the crc32 of every file inside an archive
    Verify(verify::Commands),
    /// unpack every lite archive found in a folder
    UnpackDir(unpack_dir::Commands),
}

fn load_archive(path: &Path) -> anyhow::Result<Archive> {
    let archive = Archive::open(path)
        .with_context(|| format!("failed to load input archive '{}'", path.display()))?;

    utils::print_summary(path, &archive);

    Ok(archive)
}
