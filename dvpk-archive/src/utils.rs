use std::io::{Read, Seek, SeekFrom};

use crate::Format;

/// read the last four bytes of the given reader, `None` if it's shorter than that.
/// this function will restore reader position after reading the marker.
pub fn read_marker<R: Read + Seek>(reader: &mut R) -> std::io::Result<Option<[u8; 4]>> {
    let pos = reader.stream_position()?;
    let size = reader.seek(SeekFrom::End(0))?;

    let marker = if size < 4 {
        None
    } else {
        reader.seek(SeekFrom::Start(size - 4))?;
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Some(buf)
    };

    reader.seek(SeekFrom::Start(pos))?;
    Ok(marker)
}

/// try to detect the archive format from the given reader.
/// this function will restore reader position after trying to detect the format.
pub fn try_detect_format<R: Read + Seek>(reader: &mut R) -> std::io::Result<Option<Format>> {
    Ok(read_marker(reader)?.and_then(|marker| Format::from_marker(&marker)))
}
