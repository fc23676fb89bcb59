use std::path::Path;

use super::*;

impl Config {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn sample_source(&self) -> &SampleSource {
        &self.sample_source
    }

    pub fn sample_list(&self) -> Option<&Path> {
        self.sample_list.as_deref()
    }

    pub fn list_style(&self) -> ListStyle {
        self.list_style
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn version_keys(&self) -> &VersionKeys {
        &self.version_keys
    }

    pub fn suffixes(&self) -> &ReadSuffixes {
        &self.suffixes
    }
}
