use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

pub const PIPELINE_DIRS: [&str; 7] = [
    // FASTQ files
    "Pipeline/Fastq/Raw",
    "Pipeline/Fastq/CutAdapt",
    // QC reports
    "Pipeline/QC/Raw",
    "Pipeline/QC/CutAdapt",
    // STAR
    "Pipeline/STAR/out",
    "Pipeline/STAR/genome/out",
    // StringTie
    "Pipeline/StringTie",
];

const RAW_FASTQ_DIR: &str = "Pipeline/Fastq/Raw";

/// Directory tree used by the pipeline, rooted at the working directory
pub struct PipelineLayout {
    root: PathBuf,
}

impl PipelineLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(RAW_FASTQ_DIR)
    }

    pub fn dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        PIPELINE_DIRS.iter().map(|d| self.root.join(d))
    }

    /// Create any missing directories. Existing directories are left alone.
    pub fn create_directories(&self) -> anyhow::Result<()> {
        for dir in self.dirs() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create directory {}", dir.display()))?;
            debug!("Directory {} ready", dir.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_full_tree() {
        let tmp = tempdir().unwrap();
        let layout = PipelineLayout::new(tmp.path());
        layout.create_directories().unwrap();
        for d in PIPELINE_DIRS.iter() {
            assert!(tmp.path().join(d).is_dir(), "{} missing", d);
        }
        assert_eq!(layout.raw_dir(), tmp.path().join("Pipeline/Fastq/Raw"));
    }

    #[test]
    fn rerun_is_noop() {
        let tmp = tempdir().unwrap();
        let layout = PipelineLayout::new(tmp.path());
        layout.create_directories().unwrap();
        let marker = layout.raw_dir().join("keep.fastq.gz");
        fs::write(&marker, b"x").unwrap();
        layout.create_directories().unwrap();
        assert!(marker.is_file());
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("Pipeline"), b"").unwrap();
        assert!(PipelineLayout::new(tmp.path()).create_directories().is_err());
    }
}
