use std::{fs, path::Path};

use crate::{config_doc::ConfigDocument, error::SetupError};

pub const GENOME_PARAMETERS: &str = "genomeParameters.txt";
const VERSION_GENOME_KEY: &str = "versionGenome";

/// Config keys holding the installed STAR version and the prebuilt index
#[derive(Debug, Clone)]
pub struct VersionKeys {
    pub version: String,
    pub index: String,
}

impl Default for VersionKeys {
    fn default() -> Self {
        Self {
            version: "star_version".to_string(),
            index: "star_genome_dir".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum VersionCheck {
    /// No prebuilt index declared
    Skipped,
    Matched(String),
}

/// Version token of an installed aligner string: everything after the first `v`
pub fn installed_version(s: &str) -> &str {
    s.split_once('v').map(|(_, v)| v).unwrap_or(s)
}

/// Value of `versionGenome` in the contents of a genomeParameters.txt file
pub fn index_version(params: &str) -> Option<&str> {
    params.lines().find_map(|l| {
        let mut it = l.split(['\t', ' ']).filter(|s| !s.is_empty());
        match (it.next(), it.next()) {
            (Some(VERSION_GENOME_KEY), Some(v)) => Some(v.trim_end()),
            _ => None,
        }
    })
}

fn read_index_version(index_dir: &Path) -> anyhow::Result<String> {
    let path = index_dir.join(GENOME_PARAMETERS);
    let params = fs::read_to_string(&path)
        .map_err(|_| SetupError::IndexPathMismatch { path: path.clone() })?;
    debug!("Read {}", path.display());
    index_version(&params)
        .map(|s| s.to_string())
        .ok_or_else(|| {
            SetupError::MissingConfigField {
                field: VERSION_GENOME_KEY.to_string(),
                path,
            }
            .into()
        })
}

/// Check that the STAR index was built by the installed STAR version
pub fn check_star_version(doc: &ConfigDocument, keys: &VersionKeys) -> anyhow::Result<VersionCheck> {
    let index = doc.require_scalar(&keys.index)?;
    if index == "False" {
        info!("No prebuilt STAR index declared, skipping version check");
        return Ok(VersionCheck::Skipped);
    }
    let installed = installed_version(doc.require_scalar(&keys.version)?);
    let built = read_index_version(Path::new(index))?;
    if installed != built {
        return Err(SetupError::VersionMismatch {
            installed: installed.to_string(),
            index: built,
        }
        .into());
    }
    info!("STAR version {} matches index {}", installed, index);
    Ok(VersionCheck::Matched(built))
}
