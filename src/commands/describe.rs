use std::path::PathBuf;

use anstream::println;
use anyhow::Context;
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
    /// write the description to this file instead of stdout
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl Commands {
    /// handle the user command
    pub fn start(self, archive: Archive) -> anyhow::Result<()> {
        let description = archive.describe();

        match self.output {
            Some(output) => {
                std::fs::write(&output, description)
                    .context("failed to write description to output file")?;
                println!("{} description saved to '{}'", "[+]".green(), output.display());
            }
            None => println!("{description}"),
        }

        Ok(())
    }
}
