//! Resource mirroring with delta transfer.
//!
//! Every file under the resources tree maps 1:1 into the output tree. A
//! missing destination gets a plain byte copy; an existing destination is
//! rewritten through a signature/diff/apply round so that large, mostly
//! unchanged assets only cost their changed blocks across repeated builds.
//! One broken file never stops the rest of the sync.

use crate::compiler::collect_files;
use crate::log;
use anyhow::{Context, Result, anyhow};
use fast_rsync::{Signature, SignatureOptions, apply, diff};
use std::{fs, path::Path};

/// Block granularity for destination signatures.
const SIGNATURE_OPTIONS: SignatureOptions = SignatureOptions {
    block_size: 4096,
    crypto_hash_size: 8,
};

/// Mirror `resource_root` into `output_root`.
///
/// Returns the number of files successfully synced; per-file I/O failures
/// are logged and skipped.
pub fn sync_resources(resource_root: &Path, output_root: &Path) -> Result<usize> {
    let files = collect_files(resource_root)?;
    let mut synced = 0;

    for file in &files {
        let rel = file
            .strip_prefix(resource_root)
            .with_context(|| format!("{} is outside the resources tree", file.display()))?;
        let dest = output_root.join(rel);

        match sync_file(file, &dest) {
            Ok(()) => synced += 1,
            Err(err) => log!("error"; "sync failed for {}: {err:#}", rel.display()),
        }
    }

    Ok(synced)
}

/// Bring one destination file up to date with its source.
fn sync_file(source: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        return delta_overwrite(source, dest);
    }

    // First-time sync degenerates to a full copy: there is no patch base
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(source, dest).with_context(|| format!("failed to copy to {}", dest.display()))?;
    Ok(())
}

/// Rewrite `dest` as `source` via a patch against the existing bytes.
fn delta_overwrite(source: &Path, dest: &Path) -> Result<()> {
    let base = fs::read(dest).with_context(|| format!("failed to read {}", dest.display()))?;
    let wanted = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;

    let signature = Signature::calculate(&base, SIGNATURE_OPTIONS);
    let indexed = signature.index();

    let mut patch = Vec::new();
    diff(&indexed, &wanted, &mut patch).map_err(|err| anyhow!("delta computation failed: {err}"))?;

    let mut patched = Vec::with_capacity(wanted.len());
    apply(&base, &patch, &mut patched).map_err(|err| anyhow!("patch application failed: {err}"))?;

    fs::write(dest, patched).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_first_sync_copies_bytes() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "img/logo.bin", b"\x00\x01binary");
        write(src.path(), "robots.txt", b"User-agent: *\n");

        let synced = sync_resources(src.path(), out.path()).unwrap();
        assert_eq!(synced, 2);
        assert_eq!(
            fs::read(out.path().join("img/logo.bin")).unwrap(),
            b"\x00\x01binary"
        );
        assert_eq!(
            fs::read(out.path().join("robots.txt")).unwrap(),
            b"User-agent: *\n"
        );
    }

    #[test]
    fn test_resync_is_idempotent() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let payload: Vec<u8> = (0..16 * 1024).map(|i| (i % 251) as u8).collect();
        write(src.path(), "data.bin", &payload);

        sync_resources(src.path(), out.path()).unwrap();
        sync_resources(src.path(), out.path()).unwrap();

        assert_eq!(fs::read(out.path().join("data.bin")).unwrap(), payload);
    }

    #[test]
    fn test_delta_overwrite_converges_on_changed_source() {
        let dir = TempDir::new().unwrap();
        let mut payload: Vec<u8> = (0..32 * 1024).map(|i| (i % 239) as u8).collect();
        write(dir.path(), "dest.bin", &payload);

        // Change a single block of the source; destination must converge
        payload[10_000..10_016].copy_from_slice(b"0123456789abcdef");
        write(dir.path(), "src.bin", &payload);

        delta_overwrite(&dir.path().join("src.bin"), &dir.path().join("dest.bin")).unwrap();
        assert_eq!(fs::read(dir.path().join("dest.bin")).unwrap(), payload);
    }

    #[test]
    fn test_one_bad_file_does_not_stop_the_rest() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(src.path(), "good.txt", b"ok");
        write(src.path(), "late.txt", b"also ok");
        // A directory already sitting where a file must land makes that
        // single entry fail
        fs::create_dir_all(out.path().join("good.txt")).unwrap();

        let synced = sync_resources(src.path(), out.path()).unwrap();
        assert_eq!(synced, 1);
        assert_eq!(fs::read(out.path().join("late.txt")).unwrap(), b"also ok");
    }

    #[test]
    fn test_missing_resource_root_is_an_error() {
        let out = TempDir::new().unwrap();
        assert!(sync_resources(&out.path().join("missing"), out.path()).is_err());
    }
}
