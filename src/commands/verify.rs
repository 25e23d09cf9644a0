use std::path::PathBuf;

use anstream::println;
use clap::{Parser, ValueHint};
use dvpk_archive::archive::Archive;
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
    pub fn start(self, mut archive: Archive) -> anyhow::Result<()> {
        println!("{} validating files checksum", "[+]".green());

        let total = archive.files().len();
        let failures = archive.verify_all();

        for (path, error) in &failures {
            println!("{} '{}': {error}", "[!]".red(), path);
        }

        if !failures.is_empty() {
            anyhow::bail!(
                "{} of {total} files failed verification, maybe the archive is broken?",
                failures.len()
            );
        }

        println!("{} all {total} files are valid", "[+]".green());

        Ok(())
    }
}
