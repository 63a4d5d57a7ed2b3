//! Encrypted vault file I/O
//!
//! A vault file is `u32 salt_length || salt || ciphertext_blob`, big-endian.
//! Writes go to a temp file in the same directory which is then renamed over
//! the target, so a crash mid-write leaves the previous vault intact.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::crypto::SALT_SIZE;
use crate::error::{VaultError, VaultResult};

/// Suffix for the in-progress write
const TMP_EXTENSION: &str = "tmp";

/// Check if a usable vault file exists at the given path.
///
/// A zero-length file counts as absent: it holds neither salt nor records.
pub fn vault_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Ensure the vault's parent directory exists with owner-only permissions.
pub fn ensure_vault_dir(path: &Path) -> VaultResult<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o700);
        fs::set_permissions(dir, perms)?;
    }
    Ok(())
}

/// Read a vault file, returning the salt and the ciphertext blob.
pub fn read_vault_file(path: &Path) -> VaultResult<([u8; SALT_SIZE], Vec<u8>)> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    if data.len() < 4 {
        return Err(VaultError::InvalidFormat("vault file header truncated"));
    }
    let salt_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if salt_len != SALT_SIZE {
        return Err(VaultError::InvalidFormat("unexpected salt length"));
    }
    if data.len() < 4 + SALT_SIZE {
        return Err(VaultError::InvalidFormat("vault file salt truncated"));
    }

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&data[4..4 + SALT_SIZE]);
    let blob = data[4 + SALT_SIZE..].to_vec();
    Ok((salt, blob))
}

/// Write a vault file atomically: temp file, fsync, rename.
pub fn write_vault_file(path: &Path, salt: &[u8; SALT_SIZE], blob: &[u8]) -> VaultResult<()> {
    let temp_path = temp_path_for(path);

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&(SALT_SIZE as u32).to_be_bytes())?;
        file.write_all(salt)?;
        file.write_all(blob)?;
        file.sync_all()?;

        // Owner-only before the file becomes visible under the real name
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TMP_EXTENSION);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        let salt = [7u8; SALT_SIZE];
        let blob = vec![1, 2, 3, 4, 5];
        write_vault_file(&path, &salt, &blob).unwrap();

        let (read_salt, read_blob) = read_vault_file(&path).unwrap();
        assert_eq!(read_salt, salt);
        assert_eq!(read_blob, blob);
    }

    #[test]
    fn test_vault_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        assert!(!vault_exists(&path));

        fs::write(&path, b"").unwrap();
        assert!(!vault_exists(&path), "zero-length file is not a vault");

        write_vault_file(&path, &[0u8; SALT_SIZE], b"blob").unwrap();
        assert!(vault_exists(&path));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        write_vault_file(&path, &[0u8; SALT_SIZE], b"blob").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["vault.dat"]);
    }

    #[test]
    fn test_truncated_header_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        fs::write(&path, [0u8, 0, 0]).unwrap();
        assert!(matches!(
            read_vault_file(&path),
            Err(VaultError::InvalidFormat("vault file header truncated"))
        ));
    }

    #[test]
    fn test_wrong_salt_length_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        let mut data = Vec::new();
        data.extend_from_slice(&32u32.to_be_bytes());
        data.extend_from_slice(&[0u8; 32]);
        fs::write(&path, &data).unwrap();

        assert!(matches!(
            read_vault_file(&path),
            Err(VaultError::InvalidFormat("unexpected salt length"))
        ));
    }

    #[test]
    fn test_truncated_salt_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        let mut data = Vec::new();
        data.extend_from_slice(&(SALT_SIZE as u32).to_be_bytes());
        data.extend_from_slice(&[0u8; SALT_SIZE - 1]);
        fs::write(&path, &data).unwrap();

        assert!(matches!(
            read_vault_file(&path),
            Err(VaultError::InvalidFormat("vault file salt truncated"))
        ));
    }

    #[test]
    fn test_empty_blob_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vault.dat");

        write_vault_file(&path, &[9u8; SALT_SIZE], b"").unwrap();
        let (_, blob) = read_vault_file(&path).unwrap();
        assert!(blob.is_empty());
    }

    #[test]
    fn test_ensure_vault_dir_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("vault.dat");

        ensure_vault_dir(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());

        // Idempotent
        ensure_vault_dir(&path).unwrap();
    }
}
