//! Recursive file and directory copying.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copies `src` to `dst`, creating every missing parent directory.
///
/// A file is copied byte-for-byte; a directory is copied recursively and
/// each mirrored directory takes the permissions of its source. Symlinks are
/// read through. The first failure aborts and leaves whatever was already
/// copied in place.
pub fn mirror(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::layout(src, e))?;
    if !meta.is_dir() {
        return copy_file(src, dst);
    }

    // Directory permissions are applied last so read-only sources do not
    // block copying their own contents.
    let mut dir_perms = Vec::new();
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| Error::walk(src, e))?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::layout(&target, e))?;
            let perms = entry
                .metadata()
                .map_err(|e| Error::walk(src, e))?
                .permissions();
            dir_perms.push((target, perms));
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    for (dir, perms) in dir_perms.into_iter().rev() {
        fs::set_permissions(&dir, perms).map_err(|e| Error::layout(&dir, e))?;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::layout(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| Error::layout(src, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_single_file_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("LICENSE");
        fs::write(&src, "MIT").unwrap();

        let dst = tmp.path().join("out/a/b/LICENSE");
        mirror(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst).unwrap(), "MIT");
    }

    #[test]
    fn test_mirror_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("sub/deeper")).unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();
        fs::write(src.join("a.go"), "package a").unwrap();
        fs::write(src.join("sub/deeper/b.c"), "int b;").unwrap();

        let dst = tmp.path().join("vendor/foo/src");
        mirror(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.go")).unwrap(), "package a");
        assert_eq!(fs::read_to_string(dst.join("sub/deeper/b.c")).unwrap(), "int b;");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn test_mirror_missing_source_is_layout_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = mirror(&tmp.path().join("nope"), &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::LayoutIo { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_mirror_keeps_directory_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("locked")).unwrap();
        fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o750)).unwrap();

        let dst = tmp.path().join("dst");
        mirror(&src, &dst).unwrap();
        let mode = fs::metadata(dst.join("locked")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }
}
