use std::{
    collections::BTreeSet,
    fmt, fs,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{builder::PossibleValue, ValueEnum};
use compress_io::compress::CompressIo;

use crate::discover::{classify, fastq_regex, ReadDir};

/// Deduplicated, lexicographically sorted sample names
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SampleNameSet(BTreeSet<String>);

impl SampleNameSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// Render as a YAML flow sequence: `["a", "b"]`
    pub fn to_flow_list(&self) -> String {
        let items: Vec<_> = self
            .iter()
            .map(|s| format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        format!("[{}]", items.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for SampleNameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| s.into()).collect())
    }
}

impl fmt::Display for SampleNameSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_flow_list())
    }
}

pub enum SampleSource {
    /// Newline delimited list of sample names supplied by the user
    Supplied(PathBuf),
    /// Names derived from the FASTQ files in the raw directory
    Derived,
}

/// File name suffixes removed from read 1 / read 2 files to get the sample name
#[derive(Debug, Clone)]
pub struct ReadSuffixes {
    pub r1: String,
    pub r2: String,
}

impl Default for ReadSuffixes {
    fn default() -> Self {
        Self {
            r1: "_R1_001.fastq.gz".to_string(),
            r2: "_R2_001.fastq.gz".to_string(),
        }
    }
}

impl ReadSuffixes {
    pub fn sample_name<'a>(&self, file_name: &'a str, dir: ReadDir) -> &'a str {
        let suffix = match dir {
            ReadDir::R1 => &self.r1,
            ReadDir::R2 => &self.r2,
        };
        file_name.strip_suffix(suffix.as_str()).unwrap_or(file_name)
    }
}

pub fn get_sample_names(
    source: &SampleSource,
    raw_dir: &Path,
    suffixes: &ReadSuffixes,
) -> anyhow::Result<SampleNameSet> {
    let names = match source {
        SampleSource::Supplied(path) => read_sample_list(path)?,
        SampleSource::Derived => raw_fastq_names(raw_dir)?
            .iter()
            .map(|(f, dir)| suffixes.sample_name(f, *dir).to_string())
            .collect(),
    };
    if names.is_empty() {
        warn!("No samples found");
    } else {
        debug!("{} samples: {}", names.len(), names);
    }
    Ok(names)
}

fn read_sample_list(path: &Path) -> anyhow::Result<SampleNameSet> {
    let rdr = CompressIo::new()
        .path(path)
        .bufreader()
        .with_context(|| format!("Could not open sample list {}", path.display()))?;
    debug!("Reading sample names from {}", path.display());
    let mut names = BTreeSet::new();
    for line in rdr.lines() {
        let line = line.with_context(|| format!("Error reading {}", path.display()))?;
        let name = line.trim_end();
        if !name.is_empty() {
            names.insert(name.to_string());
        }
    }
    Ok(SampleNameSet(names))
}

/// Sorted names of the paired-end FASTQ files in `raw_dir` with their read direction
pub fn raw_fastq_names(raw_dir: &Path) -> anyhow::Result<Vec<(String, ReadDir)>> {
    let re = fastq_regex();
    let mut v = Vec::new();
    let dir = fs::read_dir(raw_dir)
        .with_context(|| format!("Could not read directory {}", raw_dir.display()))?;
    for entry in dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match classify(&re, &name) {
            Some(dir) => v.push((name, dir)),
            None => warn!("Skipping non FASTQ file {} in {}", name, raw_dir.display()),
        }
    }
    v.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(v)
}

/// Naming convention for the sample list file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Sample,
    FileName,
}

impl ValueEnum for ListStyle {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Sample, Self::FileName]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Sample => Some(PossibleValue::new("sample").help("Sample names")),
            Self::FileName => Some(PossibleValue::new("filename").help("Raw FASTQ file names")),
        }
    }
}

pub fn write_sample_list(
    path: &Path,
    style: ListStyle,
    names: &SampleNameSet,
    raw_dir: &Path,
) -> anyhow::Result<()> {
    let entries: Vec<String> = match style {
        ListStyle::Sample => names.iter().map(|s| s.to_string()).collect(),
        ListStyle::FileName => raw_fastq_names(raw_dir)?
            .into_iter()
            .map(|(f, _)| f)
            .collect(),
    };
    let mut wrt = CompressIo::new()
        .path(path)
        .bufwriter()
        .with_context(|| format!("Could not open {} for output", path.display()))?;
    for e in entries.iter() {
        writeln!(wrt, "{}", e)?;
    }
    wrt.flush()?;
    debug!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}
