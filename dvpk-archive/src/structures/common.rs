//! common methods and types between formats

use std::io::{Seek, SeekFrom, Write};

use binrw::{BinResult, BinWrite, Endian};

/// generate crc32 of a structure exactly as it's laid out on disk
pub fn generate_crc32<D>(data: &D, endian: Endian) -> BinResult<u32>
where
    for<'a> D: BinWrite<Args<'a> = ()>,
{
    let mut writer = DummyCrc32Writer::new();
    data.write_options(&mut writer, endian, ())?;
    Ok(writer.checksum())
}

/// writer that only feeds a crc32 hasher, used to checksum structures as they are laid out on disk
pub struct DummyCrc32Writer {
    hasher: crc32fast::Hasher,
    pos: u64,
}

impl DummyCrc32Writer {
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
            pos: 0,
        }
    }

    pub fn checksum(self) -> u32 {
        self.hasher.finalize()
    }
}

impl Write for DummyCrc32Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.hasher.update(buf);
        self.pos += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Seek for DummyCrc32Writer {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let SeekFrom::Current(0) = pos else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "this writer doesn't support seek",
            ));
        };

        Ok(self.pos)
    }
}
