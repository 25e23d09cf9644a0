//! human readable dump of a superpack: footer info, files, packs and the
//! dependency table

use std::fmt::{self, Display, Write};

use super::pack::PackArchive;

/// lazily formatted description of a [`PackArchive`]
pub struct Description<'a, R> {
    archive: &'a PackArchive<R>,
}

impl<R> PackArchive<R> {
    pub fn description(&self) -> Description<'_, R> {
        Description { archive: self }
    }

    /// text table of everything inside the archive
    pub fn describe(&self) -> String {
        self.description().to_string()
    }
}

impl<R> Display for Description<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info(f)?;
        self.files(f)?;

        if self.archive.has_metadata() {
            self.packs(f)?;
            self.dependencies(f)?;
        }

        Ok(())
    }
}

impl<R> Description<'_, R> {
    fn info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.archive.info();

        writeln!(f, "DVPK info")?;
        writeln!(f, "{:<18}{:#010x}", "info_crc32:", info.info_crc32)?;
        writeln!(f, "{:<18}{:#010x}", "meta_data_crc32:", info.meta_data_crc32)?;
        writeln!(f, "{:<18}{}", "total_files:", info.total_files)
    }

    fn files(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = self.archive.files();
        let metadata = self.archive.metadata();

        let name_width = files
            .iter()
            .map(|file| file.relative_path().chars().count())
            .max()
            .unwrap_or(0)
            .max("file-name".len());

        let mut header = String::new();
        write!(
            header,
            "{:<10} | {:<name_width$} | {:<10} | {:<18} | {:<20} | {:<16} | {:<11} | {:<14} | {:<14} |",
            "file-index",
            "file-name",
            "pack-index",
            "file-original-size",
            "file-compressed-size",
            "compressed-crc32",
            "compression",
            "original-crc32",
            "start-position",
        )?;
        let separator = "-".repeat(header.len());

        writeln!(f, "{separator}")?;
        writeln!(f, "FILES")?;
        writeln!(f, "{header}")?;
        writeln!(f, "{separator}")?;

        for (index, (file, entry)) in files.iter().zip(self.archive.entries()).enumerate() {
            let pack = metadata
                .and_then(|meta| meta.pack_for_file(index))
                .map_or_else(|| "-".to_owned(), |pack| format!("p{pack}"));

            writeln!(
                f,
                "{:<10} | {:<name_width$} | {:<10} | {:<18} | {:<20} | {:<16} | {:<11} | {:<14} | {:<14} |",
                format!("f{index}"),
                file.relative_path(),
                pack,
                file.original_size(),
                file.compressed_size(),
                format!("{:#010x}", file.checksum()),
                file.compression_type().name(),
                format!("{:#010x}", entry.original_crc32),
                entry.start_position,
            )?;
        }

        writeln!(f, "{separator}")?;
        writeln!(f, "END-FILES")
    }

    fn packs(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(meta) = self.archive.metadata() else {
            return Ok(());
        };

        let name_width = meta
            .packs()
            .iter()
            .map(|pack| pack.name().chars().count())
            .max()
            .unwrap_or(0)
            .max("pack-name".len());
        let dep_width = meta
            .packs()
            .iter()
            .map(|pack| pack.dependencies().chars().count())
            .max()
            .unwrap_or(0);

        let header = format!(
            "{:<10} | {:<name_width$} | {:<dep_width$}",
            "pack-index", "pack-name", "pack-dependency-indexes"
        );
        let separator = "-".repeat(header.len());

        writeln!(f, "PACKS")?;
        writeln!(f, "{header}")?;
        writeln!(f, "{separator}")?;

        for (index, pack) in meta.packs().iter().enumerate() {
            writeln!(
                f,
                "{:<10} | {:<name_width$} | {:<dep_width$}",
                format!("p{index}"),
                pack.name(),
                pack.dependencies()
            )?;
        }

        writeln!(f, "{separator}")?;
        writeln!(f, "END-PACKS")
    }

    fn dependencies(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(meta) = self.archive.metadata() else {
            return Ok(());
        };

        let header = format!(
            "{:<10} | {} | {}",
            "pack-index", "num-of-dependencies", "all-dependency-indexes |"
        );

        writeln!(f, "START-DEPENDENCY")?;
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.len()))?;

        for index in 0..meta.pack_count() as u32 {
            let children = meta.children(index);
            write!(f, "{:<10} | {:<19} | ", format!("p{index}"), children.len())?;
            for child in children {
                write!(f, "p{child} ")?;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "-END-DEPENDENCY------------------------------------------------"
        )
    }
}
