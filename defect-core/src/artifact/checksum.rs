//! SHA-256 verification of binary model files.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ModelLoadError;

/// Hex-encoded SHA-256 of a file.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare against the digest declared in the model card.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), ModelLoadError> {
    let actual = sha256_file(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ModelLoadError::NotFound(path.to_path_buf()),
        _ => ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ModelLoadError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }

    log::debug!("checksum ok for {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // sha256("abc")
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"abc").unwrap();

        assert_eq!(sha256_file(&path).unwrap(), ABC);
    }

    #[test]
    fn test_verify_checksum_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"abc").unwrap();

        assert!(verify_checksum(&path, &ABC.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"abd").unwrap();

        let err = verify_checksum(&path, ABC).unwrap_err();
        assert!(matches!(err, ModelLoadError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_verify_checksum_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_checksum(&dir.path().join("nope.onnx"), ABC).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }
}
