use std::path::PathBuf;

use anstream::println;
use clap::{Parser, ValueHint};
use dvpk_archive::archive::{Archive, Header, HeaderWalker};
use owo_colors::OwoColorize;

use super::utils;

#[derive(Parser)]
#[command(arg_required_else_help = true)]
pub struct Commands {
    /// path to input archive
    #[arg(value_hint = ValueHint::FilePath, value_parser = utils::is_file)]
    pub input: PathBuf,
}

impl Commands {
    /// handle the user command
    pub fn start(self, archive: Archive) -> anyhow::Result<()> {
        println!(
            "{:>12} {:>12} {:<8} {:<10} {}",
            "size".bold(),
            "stored".bold(),
            "method".bold(),
            "crc32".bold(),
            "path".bold()
        );

        let mut walker = HeaderWalker::new();
        while let Some(header) = walker.next_header(&archive) {
            match header {
                Header::File(file) => println!(
                    "{:>12} {:>12} {:<8} {:#010x} {}",
                    file.original_size(),
                    file.compressed_size(),
                    file.compression_type().name(),
                    file.checksum(),
                    file.relative_path()
                ),
                Header::Meta { pack_count } => println!(
                    "{:>12} {:>12} {:<8} {:<10} {} ({pack_count} packs)",
                    "-",
                    "-",
                    "-",
                    "-",
                    header.path().cyan()
                ),
            }
        }

        Ok(())
    }
}
