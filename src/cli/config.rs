use std::path::PathBuf;

use crate::{
    samples::{ListStyle, ReadSuffixes, SampleSource},
    version::VersionKeys,
};

mod getters;
mod mk_config;

pub struct Config {
    root: PathBuf,
    config_file: PathBuf,
    sample_source: SampleSource,
    sample_list: Option<PathBuf>,
    list_style: ListStyle,
    marker: Box<str>,
    version_keys: VersionKeys,
    suffixes: ReadSuffixes,
}

#[cfg(test)]
impl Config {
    pub fn with_defaults<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
        root: P,
        config_file: Q,
        sample_source: SampleSource,
    ) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config_file: config_file.as_ref().to_path_buf(),
            sample_source,
            sample_list: None,
            list_style: ListStyle::Sample,
            marker: Box::from(crate::config_doc::DEFAULT_MARKER),
            version_keys: VersionKeys::default(),
            suffixes: ReadSuffixes::default(),
        }
    }
}
