use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

/// Paired-end FASTQ naming convention: `<anything>R1_<digits>.fastq.gz` or
/// `<anything>R2_<digits>.fastq.gz`.
pub const FASTQ_PATTERN: &str = r"^(?:(.*R1_\d*\.fastq\.gz)|(.*R2_\d*\.fastq\.gz))$";

pub fn fastq_regex() -> Regex {
    Regex::new(FASTQ_PATTERN).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDir {
    R1,
    R2,
}

/// Classify a file name as read 1 or read 2, or `None` if it is not a
/// paired-end FASTQ file
pub fn classify(re: &Regex, name: &str) -> Option<ReadDir> {
    re.captures(name).and_then(|cap| match (cap.get(1), cap.get(2)) {
        (Some(_), _) => Some(ReadDir::R1),
        (None, Some(_)) => Some(ReadDir::R2),
        _ => None,
    })
}

#[derive(Debug, Default)]
pub struct ReadGroups {
    pub r1: Vec<PathBuf>,
    pub r2: Vec<PathBuf>,
}

impl ReadGroups {
    pub fn len(&self) -> usize {
        self.r1.len() + self.r2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.r1.iter().chain(self.r2.iter())
    }
}

/// Recursively scan `root` for paired-end FASTQ files
pub fn search_fastq_files<P: AsRef<Path>>(root: P) -> ReadGroups {
    let root = root.as_ref();
    let re = fastq_regex();
    let mut groups = ReadGroups::default();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        match classify(&re, &name) {
            Some(ReadDir::R1) => groups.r1.push(entry.path().to_path_buf()),
            Some(ReadDir::R2) => groups.r2.push(entry.path().to_path_buf()),
            None => trace!("Ignoring {}", entry.path().display()),
        }
    }
    groups.r1.sort();
    groups.r2.sort();
    debug!(
        "Found {} R1 and {} R2 files under {}",
        groups.r1.len(),
        groups.r2.len(),
        root.display()
    );
    groups
}
