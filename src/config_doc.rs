use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use fs2::FileExt;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::{error::SetupError, samples::SampleNameSet};

pub const DEFAULT_MARKER: &str = "# Append";

/// Pipeline YAML configuration handled as text
///
/// Lines keep their terminators so that everything up to the append marker
/// is written back byte for byte. Fields are looked up by key, never by
/// position.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    lines: Vec<String>,
}

/// Line content without its terminator
fn content(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#')
}

/// Strip quotes or a trailing comment from a scalar value
fn unquote(v: &str) -> &str {
    let v = v.trim();
    for q in ['"', '\''] {
        if let Some(rest) = v.strip_prefix(q) {
            return rest.split(q).next().unwrap_or(rest);
        }
    }
    v.split(" #").next().unwrap_or(v).trim_end()
}

impl ConfigDocument {
    pub fn read<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        debug!("Read config file {}", path.display());
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text<P: AsRef<Path>>(path: P, text: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: text.split_inclusive('\n').map(|s| s.to_string()).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> String {
        self.lines.concat()
    }

    pub fn missing(&self, field: &str) -> SetupError {
        SetupError::MissingConfigField {
            field: field.to_string(),
            path: self.path.clone(),
        }
    }

    /// Index of the first line that is exactly `marker`
    pub fn append_index(&self, marker: &str) -> Option<usize> {
        self.lines.iter().position(|l| content(l) == marker)
    }

    /// New document with everything after the marker replaced by the sample list
    ///
    /// Without a marker the list goes at the end of the file, preceded by the
    /// marker so that the next run truncates at the same place.
    pub fn with_samples(&self, samples: &SampleNameSet, marker: &str) -> Self {
        let mut lines = match self.append_index(marker) {
            Some(ix) => {
                let mut v = self.lines[..=ix].to_vec();
                if !v[ix].ends_with('\n') {
                    v[ix].push('\n')
                }
                v
            }
            None => {
                warn!(
                    "Marker '{}' not found in {}, appending sample list at end of file",
                    marker,
                    self.path.display()
                );
                let mut v = self.lines.clone();
                if let Some(last) = v.last_mut() {
                    if !last.ends_with('\n') {
                        last.push('\n')
                    }
                }
                v.push(format!("{}\n", marker));
                v
            }
        };
        lines.push(format!(" {}\n", samples.to_flow_list()));
        Self {
            path: self.path.clone(),
            lines,
        }
    }

    /// First scalar value for `key` anywhere in the document
    pub fn scalar(&self, key: &str) -> Option<&str> {
        let re = Regex::new(&format!(r"^\s*{}:[ \t]*(.*)$", regex::escape(key))).unwrap();
        self.lines.iter().find_map(|l| {
            re.captures(content(l))
                .and_then(|c| c.get(1))
                .map(|m| unquote(m.as_str()))
        })
    }

    pub fn require_scalar(&self, key: &str) -> Result<&str, SetupError> {
        match self.scalar(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(self.missing(key)),
        }
    }

    /// Scalar `field` nested under the mapping `section`
    ///
    /// The nested block ends at the first non blank, non comment line that is
    /// not indented deeper than the section key.
    pub fn nested_scalar(&self, section: &str, field: &str) -> Option<&str> {
        let sec_re = Regex::new(&format!(r"^\s*{}:\s*(#.*)?$", regex::escape(section))).unwrap();
        let fld_re = Regex::new(&format!(r"^\s*{}:[ \t]*(.*)$", regex::escape(field))).unwrap();
        let start = self.lines.iter().position(|l| sec_re.is_match(content(l)))?;
        let sec_indent = indent(&self.lines[start]);
        for l in self.lines[start + 1..].iter().map(|l| content(l)) {
            if is_blank_or_comment(l) {
                continue;
            }
            if indent(l) <= sec_indent {
                break;
            }
            if let Some(m) = fld_re.captures(l).and_then(|c| c.get(1)) {
                return Some(unquote(m.as_str()));
            }
        }
        None
    }

    /// Replace the file on disk with this document
    ///
    /// The new contents go to a temporary file in the same directory which is
    /// then renamed over the original. The caller holds `lock` from before the
    /// document was read so that concurrent runs cannot interleave.
    pub fn commit(&self, lock: &ConfigLock) -> anyhow::Result<()> {
        debug_assert_eq!(lock.config_path(), self.path.as_path());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        self.write_atomic(dir)
    }

    fn write_atomic(&self, dir: &Path) -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Could not create temporary file in {}", dir.display()))?;
        tmp.write_all(self.text().as_bytes())?;
        tmp.flush()?;
        if let Ok(meta) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), meta.permissions())?;
        }
        tmp.persist(&self.path)
            .with_context(|| format!("Could not replace {}", self.path.display()))?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

/// Exclusive advisory lock on `<config>.lock`, released on drop
///
/// The lock file itself is left in place: deleting it while another run is
/// waiting on it would let a third run lock a fresh file at the same path.
pub struct ConfigLock {
    file: File,
    config_path: PathBuf,
    lock_path: PathBuf,
}

impl ConfigLock {
    pub fn acquire<P: AsRef<Path>>(config_path: P) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let mut lock_name = config_path.as_os_str().to_owned();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Could not open lock file {}", lock_path.display()))?;
        if file.try_lock_exclusive().is_err() {
            info!("Waiting for lock on {}", lock_path.display());
            file.lock_exclusive()
                .with_context(|| format!("Could not lock {}", lock_path.display()))?;
        }
        debug!("Locked {}", lock_path.display());
        Ok(Self {
            file,
            config_path,
            lock_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for ConfigLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str = "\
star_version: \"STAR_v2.7.9a\"
star_genome_dir: 'False' # no prebuilt index
cutadapt:
  threads: 2
  # comment
  adapter: AGATCGGAAGAGC
fastqc:

  threads: 1
io_name:
# Append
";

    fn names(v: &[&str]) -> SampleNameSet {
        v.iter().copied().collect()
    }

    #[test]
    fn keeps_header_and_replaces_tail() {
        let text = format!("{} ['old_1', 'old_2']\n", HEADER);
        let doc = ConfigDocument::from_text("config.yml", &text);
        let new = doc.with_samples(&names(&["s2", "s1"]), DEFAULT_MARKER);
        let out = new.text();
        assert!(out.starts_with(HEADER));
        assert_eq!(&out[HEADER.len()..], " [\"s1\", \"s2\"]\n");

        // Rewriting again gives the same bytes
        let again = new.with_samples(&names(&["s1", "s2"]), DEFAULT_MARKER);
        assert_eq!(again.text(), out);
    }

    #[test]
    fn missing_marker_appends_at_end() {
        let doc = ConfigDocument::from_text("config.yml", "a: 1\nb: 2");
        assert_eq!(doc.append_index(DEFAULT_MARKER), None);
        let new = doc.with_samples(&names(&["x"]), DEFAULT_MARKER);
        assert_eq!(new.text(), "a: 1\nb: 2\n# Append\n [\"x\"]\n");
        assert_eq!(new.append_index(DEFAULT_MARKER), Some(2));
    }

    #[test]
    fn marker_on_last_line_without_newline() {
        let doc = ConfigDocument::from_text("config.yml", "a: 1\n# Append");
        let first = doc.with_samples(&names(&["x"]), DEFAULT_MARKER).text();
        assert_eq!(first, "a: 1\n# Append\n [\"x\"]\n");

        let again = ConfigDocument::from_text("config.yml", &first)
            .with_samples(&names(&["x"]), DEFAULT_MARKER)
            .text();
        assert_eq!(again, first);
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yml");
        fs::write(&path, HEADER).unwrap();
        let lock = ConfigLock::acquire(&path).unwrap();
        assert_eq!(lock.lock_path(), tmp.path().join("config.yml.lock").as_path());

        let other = File::open(lock.lock_path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());
        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
        FileExt::unlock(&other).unwrap();
    }

    #[test]
    fn marker_must_match_whole_line() {
        let doc = ConfigDocument::from_text("c.yml", "  # Append here\n# Append\nx\n");
        assert_eq!(doc.append_index(DEFAULT_MARKER), Some(1));
        let doc = ConfigDocument::from_text("c.yml", "# Append\r\nx\r\n");
        assert_eq!(doc.append_index(DEFAULT_MARKER), Some(0));
    }

    #[test]
    fn keyed_lookups() {
        let doc = ConfigDocument::from_text("config.yml", HEADER);
        assert_eq!(doc.scalar("star_version"), Some("STAR_v2.7.9a"));
        assert_eq!(doc.scalar("star_genome_dir"), Some("False"));
        assert_eq!(doc.nested_scalar("cutadapt", "threads"), Some("2"));
        assert_eq!(doc.nested_scalar("fastqc", "threads"), Some("1"));
        assert_eq!(doc.nested_scalar("io_name", "threads"), None);
        assert_eq!(doc.nested_scalar("star_index", "threads"), None);
        assert!(matches!(
            doc.require_scalar("star_index_dir"),
            Err(SetupError::MissingConfigField { .. })
        ));
    }

    #[test]
    fn nested_lookup_stays_in_block() {
        let text = "stringTie:\n  mode: fast\nother:\n  threads: 8\n";
        let doc = ConfigDocument::from_text("c.yml", text);
        assert_eq!(doc.nested_scalar("stringTie", "threads"), None);
    }

    #[test]
    fn commit_replaces_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yml");
        fs::write(&path, HEADER).unwrap();
        let lock = ConfigLock::acquire(&path).unwrap();
        let doc = ConfigDocument::read(&path).unwrap();
        doc.with_samples(&names(&["a"]), DEFAULT_MARKER).commit(&lock).unwrap();
        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(out, format!("{} [\"a\"]\n", HEADER));
        // Only the config and its lock file are left behind
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
    }
}
