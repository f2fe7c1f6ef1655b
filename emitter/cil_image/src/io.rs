//! Binary artifact read/write.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::module::ModuleImage;

/// Magic bytes at the start of every image file.
pub const MAGIC: [u8; 4] = *b"CILM";

/// Current on-disk format version.
pub const FORMAT_VERSION: u16 = 1;

/// Failure while encoding, decoding, or transporting an image file.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a module image (bad magic)")]
    BadMagic,
    #[error("unsupported image format version {0}")]
    UnsupportedVersion(u16),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// Serialize an image to `path`.
pub fn write_image(path: &Path, image: &ModuleImage) -> Result<(), ImageError> {
    let payload =
        bincode::serialize(image).map_err(|e| ImageError::Encode(e.to_string()))?;
    let mut file = fs::File::create(path)?;
    file.write_all(&MAGIC)?;
    file.write_all(&FORMAT_VERSION.to_le_bytes())?;
    file.write_all(&payload)?;
    Ok(())
}

/// Deserialize an image from `path`.
pub fn read_image(path: &Path) -> Result<ModuleImage, ImageError> {
    let bytes = fs::read(path)?;
    if bytes.len() < 6 || bytes[..4] != MAGIC {
        return Err(ImageError::BadMagic);
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(ImageError::UnsupportedVersion(version));
    }
    bincode::deserialize(&bytes[6..]).map_err(|e| ImageError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.dll");
        let image = ModuleImage::new("Probe", [1, 2, 3, 4], "probe.dll", ModuleKind::Library);
        write_image(&path, &image).unwrap();
        let back = read_image(&path).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.dll");
        std::fs::write(&path, b"nope").unwrap();
        assert!(matches!(read_image(&path), Err(ImageError::BadMagic)));
    }

    #[test]
    fn test_version_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.dll");
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&99u16.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(
            read_image(&path),
            Err(ImageError::UnsupportedVersion(99))
        ));
    }
}
