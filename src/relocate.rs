use std::{fs, io, path::Path};

use anyhow::Context;

use crate::{discover::ReadGroups, error::SetupError};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelocationSummary {
    pub moved: usize,
    pub skipped: usize,
}

/// Move every discovered read file into `raw_dir`
///
/// Files already under `raw_dir` are left where they are. An existing file
/// at the destination is never overwritten: the run stops with
/// [`SetupError::DestinationExists`] instead.
pub fn move_fastq_files<P: AsRef<Path>>(
    groups: &ReadGroups,
    raw_dir: P,
) -> anyhow::Result<RelocationSummary> {
    let raw_dir = raw_dir.as_ref();
    let raw_canon = raw_dir
        .canonicalize()
        .with_context(|| format!("Raw FASTQ directory {} not accessible", raw_dir.display()))?;
    let mut summary = RelocationSummary::default();

    for path in groups.iter() {
        if is_within(path, &raw_canon)? {
            trace!("{} already in place", path.display());
            summary.skipped += 1;
            continue;
        }
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("No file name in path {}", path.display()))?;
        let dest = raw_dir.join(name);
        if dest.exists() {
            return Err(SetupError::DestinationExists {
                file: path.clone(),
                dest,
            }
            .into());
        }
        move_file(path, &dest)?;
        debug!("Moved {} to {}", path.display(), dest.display());
        summary.moved += 1;
    }
    Ok(summary)
}

fn is_within(path: &Path, dir_canon: &Path) -> anyhow::Result<bool> {
    let canon = path
        .canonicalize()
        .with_context(|| format!("Could not resolve {}", path.display()))?;
    Ok(canon.starts_with(dir_canon))
}

fn move_file(from: &Path, to: &Path) -> anyhow::Result<()> {
    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
            debug!("{} is on another device, copying", from.display());
            copy_and_remove(from, to)
        }
        Err(e) => Err(e).with_context(|| {
            format!("Could not move {} to {}", from.display(), to.display())
        }),
    }
}

fn copy_and_remove(from: &Path, to: &Path) -> anyhow::Result<()> {
    let res: io::Result<()> = fs::copy(from, to).and_then(|_| fs::remove_file(from));
    res.with_context(|| format!("Could not copy {} to {}", from.display(), to.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::search_fastq_files;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempdir().unwrap();
        let raw = tmp.path().join("Pipeline/Fastq/Raw");
        fs::create_dir_all(&raw).unwrap();
        (tmp, raw)
    }

    #[test]
    fn moves_then_idempotent() {
        let (tmp, raw) = setup();
        let incoming = tmp.path().join("incoming");
        fs::create_dir(&incoming).unwrap();
        fs::write(incoming.join("S1_R1_001.fastq.gz"), b"r1").unwrap();
        fs::write(incoming.join("S1_R2_001.fastq.gz"), b"r2").unwrap();
        fs::write(raw.join("S0_R1_001.fastq.gz"), b"r0").unwrap();

        let groups = search_fastq_files(tmp.path());
        let s = move_fastq_files(&groups, &raw).unwrap();
        assert_eq!(s, RelocationSummary { moved: 2, skipped: 1 });
        assert_eq!(fs::read(raw.join("S1_R1_001.fastq.gz")).unwrap(), b"r1");
        assert!(!incoming.join("S1_R2_001.fastq.gz").exists());

        let groups = search_fastq_files(tmp.path());
        let s = move_fastq_files(&groups, &raw).unwrap();
        assert_eq!(s, RelocationSummary { moved: 0, skipped: 3 });
    }

    #[test]
    fn similar_directory_name_is_not_raw() {
        // Substring matching on the path would treat this as already in place
        let (tmp, raw) = setup();
        let decoy = tmp.path().join("old/Pipeline/Fastq/Raw");
        fs::create_dir_all(&decoy).unwrap();
        fs::write(decoy.join("S2_R1_001.fastq.gz"), b"").unwrap();

        let groups = search_fastq_files(tmp.path());
        let s = move_fastq_files(&groups, &raw).unwrap();
        assert_eq!(s.moved, 1);
        assert!(raw.join("S2_R1_001.fastq.gz").is_file());
    }

    #[test]
    fn conflict_fails_without_overwrite() {
        let (tmp, raw) = setup();
        fs::write(raw.join("S3_R1_001.fastq.gz"), b"original").unwrap();
        let other = tmp.path().join("other");
        fs::create_dir(&other).unwrap();
        fs::write(other.join("S3_R1_001.fastq.gz"), b"new").unwrap();

        let groups = search_fastq_files(tmp.path());
        let err = move_fastq_files(&groups, &raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::DestinationExists { .. })
        ));
        assert_eq!(fs::read(raw.join("S3_R1_001.fastq.gz")).unwrap(), b"original");
        assert!(other.join("S3_R1_001.fastq.gz").exists());
    }
}
