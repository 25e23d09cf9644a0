use std::path::{Component, Path, PathBuf};

use anstream::println;
use dvpk_archive::{Format, archive::Archive};
use owo_colors::OwoColorize;

pub fn is_file(path: &str) -> Result<PathBuf, String> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err("You need to pass a valid file path.".to_owned());
    }
    Ok(path.to_path_buf())
}

pub fn is_dir(path: &str) -> Result<PathBuf, String> {
    let path = Path::new(path);
    if !path.is_dir() {
        return Err("You need to pass a valid dir path.".to_owned());
    }
    Ok(path.to_path_buf())
}

/// join an archive path to the output folder, refusing anything that would
/// end up outside of it
pub fn output_path(output: &Path, relative_path: &str) -> anyhow::Result<PathBuf> {
    let relative = Path::new(relative_path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes || relative_path.is_empty() {
        anyhow::bail!("refusing to write '{relative_path}' outside of output folder");
    }

    Ok(output.join(relative))
}

/// write `bytes` to `path`, creating parent folders when needed
pub fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.is_dir()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

/// print what was loaded to stdout
pub fn print_summary(path: &Path, archive: &Archive) {
    let format = match archive.format() {
        Format::Pack => "superpack (dvpk)",
        Format::Lite => "lite archive (dvpl)",
    };
    let packs = archive
        .metadata()
        .map_or_else(|| "no meta data".to_owned(), |meta| meta.pack_count().to_string());

    println!(
        concat!(
            "{} loaded '{}':\n",
            " {dot} format: {}\n",
            " {dot} files: {}\n",
            " {dot} packs: {}",
        ),
        "[?]".green(),
        path.display(),
        format,
        archive.files().len(),
        packs,
        dot = "|>".cyan(),
    )
}

pub fn progress_bar(len: u64) -> indicatif::ProgressBar {
    let style = indicatif::ProgressStyle::with_template(
        "{prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] [{pos:>4}/{len:4}] {msg}",
    )
    .map(|style| style.progress_chars("=> "))
    .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar());

    indicatif::ProgressBar::new(len).with_style(style).with_prefix(
        "[P]"
            .if_supports_color(owo_colors::Stream::Stdout, |t| t.green())
            .to_string(),
    )
}
