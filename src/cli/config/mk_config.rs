use std::path::PathBuf;

use clap::ArgMatches;

use crate::{
    samples::{ListStyle, ReadSuffixes, SampleSource},
    version::VersionKeys,
};

use super::Config;

impl Config {
    pub fn from_matches(m: &ArgMatches) -> anyhow::Result<Self> {
        let root = m
            .get_one::<PathBuf>("dir")
            .cloned()
            .expect("Missing default working directory");
        if !root.is_dir() {
            return Err(anyhow!(
                "Working directory {} does not exist",
                root.display()
            ));
        }

        let config_file = m
            .get_one::<PathBuf>("config")
            .cloned()
            .expect("Missing default config file");
        if !config_file.is_file() {
            return Err(anyhow!(
                "Config file {} not found",
                config_file.display()
            ));
        }
        debug!("Using config file {}", config_file.display());

        let sample_source = match m.get_one::<PathBuf>("sample") {
            Some(p) => {
                debug!("Sample names will be read from {}", p.display());
                SampleSource::Supplied(p.clone())
            }
            None => SampleSource::Derived,
        };

        let sample_list = m.get_one::<PathBuf>("sample_list").cloned();
        let list_style = *m.try_get_one::<ListStyle>("list_style")?.unwrap();

        let marker = m
            .get_one::<String>("marker")
            .map(|s| Box::from(s.as_str()))
            .unwrap();
        let get_str = |k: &str| m.get_one::<String>(k).cloned().unwrap();

        let version_keys = VersionKeys {
            version: get_str("version_key"),
            index: get_str("index_key"),
        };
        let suffixes = ReadSuffixes {
            r1: get_str("r1_suffix"),
            r2: get_str("r2_suffix"),
        };

        Ok(Config {
            root,
            config_file,
            sample_source,
            sample_list,
            list_style,
            marker,
            version_keys,
            suffixes,
        })
    }
}
