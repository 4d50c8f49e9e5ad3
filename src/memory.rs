//! Memory images and load-time validation
//!
//! The BIOS and cartridge images are the only inputs the core takes from the
//! outside world; both arrive as byte buffers and are validated here. The
//! working RAM stores live in [`crate::bus::Bus`]; video memory lives in the
//! PPU.

use thiserror::Error;

/// BIOS image size, exactly 16 KiB.
pub const BIOS_SIZE: usize = 0x4000;
/// External work RAM, 256 KiB.
pub const EWRAM_SIZE: usize = 0x40000;
/// Internal work RAM, 32 KiB.
pub const IWRAM_SIZE: usize = 0x8000;
/// Cartridge SRAM, 64 KiB.
pub const SRAM_SIZE: usize = 0x10000;
/// Largest supported cartridge image, 32 MiB.
pub const ROM_MAX_SIZE: usize = 0x200_0000;

/// Failure to accept a BIOS or ROM image. These are the only errors the core
/// surfaces; everything at run time follows hardware behavior instead of
/// failing.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("BIOS image must be exactly {BIOS_SIZE} bytes, got {0}")]
    BiosSize(usize),
    #[error("ROM image larger than 32 MiB ({0} bytes)")]
    RomTooLarge(usize),
}

/// Validate and copy a BIOS image.
pub fn load_bios(bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
    if bytes.len() != BIOS_SIZE {
        return Err(LoadError::BiosSize(bytes.len()));
    }
    Ok(bytes.to_vec())
}

/// A loaded cartridge image plus the header metadata of interest.
#[derive(Debug, Clone, Default)]
pub struct Rom {
    data: Vec<u8>,
    title: String,
    code: String,
    maker: String,
}

impl Rom {
    /// Validate and copy a cartridge image. Header fields (title at 0xA0,
    /// game code at 0xAC, maker code at 0xB0) are extracted when the image
    /// is large enough to contain them; they are metadata only.
    pub fn load(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() > ROM_MAX_SIZE {
            return Err(LoadError::RomTooLarge(bytes.len()));
        }
        let header_str = |range: core::ops::Range<usize>| -> String {
            if bytes.len() < range.end {
                return String::new();
            }
            bytes[range]
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect()
        };
        Ok(Self {
            title: header_str(0xA0..0xAC),
            code: header_str(0xAC..0xB0),
            maker: header_str(0xB0..0xB2),
            data: bytes.to_vec(),
        })
    }

    /// Image size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Game title from the cartridge header.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Four-character game code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Two-character maker code.
    pub fn maker(&self) -> &str {
        &self.maker
    }

    /// Read a byte inside the image. Callers handle out-of-range addresses
    /// (they produce the open-bus pattern, not a fault).
    #[inline]
    pub fn byte(&self, offset: usize) -> u8 {
        self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bios_size_enforced() {
        assert!(load_bios(&[0u8; BIOS_SIZE]).is_ok());
        assert!(matches!(
            load_bios(&[0u8; 100]),
            Err(LoadError::BiosSize(100))
        ));
        assert!(load_bios(&[0u8; BIOS_SIZE + 1]).is_err());
    }

    #[test]
    fn test_rom_header_metadata() {
        let mut image = vec![0u8; 0xC0];
        image[0xA0..0xA9].copy_from_slice(b"TESTTITLE");
        image[0xAC..0xB0].copy_from_slice(b"ABCD");
        image[0xB0..0xB2].copy_from_slice(b"01");

        let rom = Rom::load(&image).unwrap();
        assert_eq!(rom.title(), "TESTTITLE");
        assert_eq!(rom.code(), "ABCD");
        assert_eq!(rom.maker(), "01");
        assert_eq!(rom.size(), 0xC0);
    }

    #[test]
    fn test_rom_without_header() {
        // Tiny images load fine; metadata is just empty.
        let rom = Rom::load(&[0x12, 0x34]).unwrap();
        assert_eq!(rom.title(), "");
        assert_eq!(rom.size(), 2);
    }

    #[test]
    fn test_rom_too_large() {
        let image = vec![0u8; ROM_MAX_SIZE + 1];
        assert!(matches!(Rom::load(&image), Err(LoadError::RomTooLarge(_))));
    }
}
