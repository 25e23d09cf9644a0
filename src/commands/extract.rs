use std::path::{Path, PathBuf};

use anstream::println;
use anyhow::Context;
use clap::{Parser, ValueHint};
use dvpk_archive::archive::{Archive, ArchiveError, META_ENTRY_NAME};
use indicatif::ParallelProgressIterator;
use owo_colors::OwoColorize;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::utils;

#[derive(Parser)]
#[command(arg_required_else_help = true)]
pub struct Commands {
    /// path to input archive
    #[arg(value_hint = ValueHint::FilePath, value_parser = utils::is_file)]
    pub input: PathBuf,
    /// output folder, if empty a folder with the same name as input will be used
    #[arg(value_hint = ValueHint::DirPath)]
    pub output_folder: Option<PathBuf>,
    /// also write the archive description as `meta.meta` when the archive have meta data
    #[arg(long, short = 'm', default_value_t = false)]
    pub meta: bool,
    /// stop at the first file that fails instead of reporting it and moving on
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

impl Commands {
    /// handle the user command
    pub fn start(self, archive: Archive) -> anyhow::Result<()> {
        let output = self
            .output_folder
            .clone()
            .unwrap_or_else(|| default_output(&self.input));

        println!("{} output folder: {}", "[+]".green(), output.display());

        if !output.is_dir() {
            println!("{} creating output folder", "[+]".green());
            std::fs::create_dir_all(&output).context("failed to create output folder")?;
        }

        if self.meta {
            if archive.has_metadata() {
                let path = output.join(META_ENTRY_NAME);
                std::fs::write(&path, archive.describe())
                    .context("failed to write meta entry to output folder")?;
                println!("{} saved {META_ENTRY_NAME}", "[+]".green());
            } else {
                println!(
                    "{} archive doesn't have meta data, skipping {META_ENTRY_NAME}",
                    "[!]".yellow()
                );
            }
        }

        // every worker opens its own copy of the archive, reading move the file cursor
        let files: Vec<String> = archive
            .files()
            .iter()
            .map(|file| file.relative_path().to_owned())
            .collect();
        drop(archive);

        println!("{} starting the extraction", "[+]".green());

        let pb = utils::progress_bar(files.len() as _);
        let open = || Archive::open(&self.input);

        let failures: Vec<(String, anyhow::Error)> = if self.strict {
            files
                .par_iter()
                .progress_with(pb.clone())
                .try_for_each_init(open, |archive, path| {
                    pb.set_message(path.clone());
                    extract_file(archive, path, &output)
                        .with_context(|| format!("failed to extract '{path}'"))
                })?;
            Vec::new()
        } else {
            files
                .par_iter()
                .progress_with(pb.clone())
                .map_init(open, |archive, path| {
                    pb.set_message(path.clone());
                    extract_file(archive, path, &output).map_err(|e| (path.clone(), e))
                })
                .filter_map(Result::err)
                .collect()
        };

        pb.finish_with_message(
            "extraction finished"
                .if_supports_color(owo_colors::Stream::Stdout, |t| t.green())
                .to_string(),
        );

        for (path, error) in &failures {
            println!("{} failed to extract '{path}': {error:#}", "[!]".red());
        }

        if !failures.is_empty() {
            anyhow::bail!(
                "{} of {} files couldn't be extracted",
                failures.len(),
                files.len()
            );
        }

        println!(
            "{} extraction finished and all files saved in '{}'",
            "[+]".green(),
            output.display()
        );

        Ok(())
    }
}

/// input path without its extension, or `<input>.out` when there's nothing to strip
fn default_output(input: &Path) -> PathBuf {
    let stripped = input.with_extension("");
    if stripped == input {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    } else {
        stripped
    }
}

fn extract_file(
    archive: &mut Result<Archive, ArchiveError>,
    relative_path: &str,
    output: &Path,
) -> anyhow::Result<()> {
    let archive = archive
        .as_mut()
        .map_err(|e| anyhow::anyhow!("failed to open archive for worker: {e}"))?;

    let path = utils::output_path(output, relative_path)?;
    let bytes = archive.extract(relative_path)?;

    utils::write_file(&path, &bytes)
        .with_context(|| format!("failed to write '{}'", path.display()))
}
