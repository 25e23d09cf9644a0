use std::{fs::File, io::BufWriter, path::PathBuf};

use anstream::{print, println};
use anyhow::Context;
use clap::{Parser, ValueHint};
use dvpk_archive::archive::Archive;
use owo_colors::OwoColorize;
use serde_json::{json, to_value};

use super::utils;

#[derive(Parser)]
#[command(arg_required_else_help = true)]
pub struct Commands {
    /// path to input archive
    #[arg(value_hint = ValueHint::FilePath, value_parser = utils::is_file)]
    pub input: PathBuf,
    /// output json file, if empty a json file with the same name of input archive will be created
    pub output: Option<PathBuf>,
}

impl Commands {
    /// handle the user command
    pub fn start(self, archive: Archive) -> anyhow::Result<()> {
        let output = self
            .output
            .unwrap_or_else(|| self.input.with_extension("json"));

        println!("{} output file: {}", "[+]".green(), output.display());
        print!("{} serializing raw structures to json", "[+]".green());

        let value = match &archive {
            Archive::Pack(pack) => json!({
                "format": "dvpk",
                "footer": to_value(pack.raw_footer())?,
                "entries": to_value(pack.raw_entries())?
            }),
            Archive::Lite(lite) => json!({
                "format": "dvpl",
                "file": lite.file().relative_path(),
                "footer": to_value(lite.raw_footer())?
            }),
        };

        let writer =
            BufWriter::new(File::create(output).context("failed to create output json file")?);

        serde_json::to_writer_pretty(writer, &value).context("failed to serialize archive")?;

        println!(": Done");

        Ok(())
    }
}
