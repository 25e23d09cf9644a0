use std::path::{Path, PathBuf};

use anstream::println;
use anyhow::Context;
use clap::{Parser, ValueHint};
use dvpk_archive::archive::LiteArchive;
use indicatif::ParallelProgressIterator;
use owo_colors::OwoColorize;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::utils;

const LITE_EXTENSION: &str = "dvpl";

#[derive(Parser)]
#[command(arg_required_else_help = true)]
pub struct Commands {
    /// folder to search for lite archives
    #[arg(value_hint = ValueHint::DirPath, value_parser = utils::is_dir)]
    pub input_folder: PathBuf,
    /// output folder, if empty files are unpacked next to their archives
    #[arg(value_hint = ValueHint::DirPath)]
    pub output_folder: Option<PathBuf>,
    /// remove every lite archive after it was unpacked
    #[arg(long, default_value_t = false)]
    pub remove: bool,
}

impl Commands {
    /// handle the user command
    pub fn start(self) -> anyhow::Result<()> {
        let output = self
            .output_folder
            .clone()
            .unwrap_or_else(|| self.input_folder.clone());

        let archives = list_lite_archives(&self.input_folder);
        if archives.is_empty() {
            anyhow::bail!("there's no lite archive in input folder");
        }

        println!(
            "{} found {} lite archives in input folder",
            "[+]".green(),
            archives.len()
        );
        println!("{} output folder: {}", "[+]".green(), output.display());

        let pb = utils::progress_bar(archives.len() as _);

        let failures: Vec<(PathBuf, anyhow::Error)> = archives
            .par_iter()
            .progress_with(pb.clone())
            .filter_map(|relative| {
                pb.set_message(relative.display().to_string());
                self.unpack(relative, &output)
                    .err()
                    .map(|e| (relative.clone(), e))
            })
            .collect();

        pb.finish_with_message(
            "unpacking finished"
                .if_supports_color(owo_colors::Stream::Stdout, |t| t.green())
                .to_string(),
        );

        for (path, error) in &failures {
            println!("{} failed to unpack '{}': {error:#}", "[!]".red(), path.display());
        }

        if !failures.is_empty() {
            anyhow::bail!(
                "{} of {} lite archives couldn't be unpacked",
                failures.len(),
                archives.len()
            );
        }

        println!("{} all lite archives unpacked", "[+]".green());

        Ok(())
    }

    /// unpack one archive, `relative` is relative to the input folder
    fn unpack(&self, relative: &Path, output: &Path) -> anyhow::Result<()> {
        let source = self.input_folder.join(relative);
        let mut archive = LiteArchive::open(&source).context("failed to load lite archive")?;

        let name = archive.file().relative_path().to_owned();
        let bytes = archive.extract(&name)?;

        let parent = relative.parent().unwrap_or(Path::new(""));
        let target = output.join(parent).join(&name);
        utils::write_file(&target, &bytes)
            .with_context(|| format!("failed to write '{}'", target.display()))?;

        if self.remove {
            std::fs::remove_file(&source).context("failed to remove lite archive")?;
        }

        Ok(())
    }
}

/// every `*.dvpl` file under `input`, relative to it
fn list_lite_archives(input: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(input)
        .into_iter()
        .filter_map(|e| {
            let f = e.ok()?;
            if !f.file_type().is_file() {
                return None;
            }

            let is_lite = f
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(LITE_EXTENSION));
            if !is_lite {
                return None;
            }

            Some(f.path().strip_prefix(input).ok()?.to_path_buf())
        })
        .collect()
}
