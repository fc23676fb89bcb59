use std::path::PathBuf;

use clap::{command, value_parser, Arg, Command};

use crate::{config_doc::DEFAULT_MARKER, log_utils::LogLevel, samples::ListStyle};

pub(super) fn cli_model() -> Command {
    command!()
    .next_help_heading("Input/Output")
    .arg(
        Arg::new("sample")
            .short('s')
            .long("sample")
            .visible_alias("sample-list-in")
            .value_parser(value_parser!(PathBuf))
            .value_name("FILE")
            .help("Input list of sample names, one per line (default: derive names from FASTQ files)"),
    )
    .arg(
        Arg::new("config")
            .short('c')
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .default_value("configs/config.yml")
            .value_name("YAML")
            .help("Pipeline configuration file"),
    )
    .arg(
        Arg::new("dir")
            .short('d')
            .long("dir")
            .value_parser(value_parser!(PathBuf))
            .default_value(".")
            .value_name("DIR")
            .help("Working directory to set up and scan for FASTQ files"),
    )
    .arg(
        Arg::new("sample_list")
            .short('o')
            .long("sample-list")
            .value_parser(value_parser!(PathBuf))
            .value_name("FILE")
            .help("Also write the list of samples to FILE"),
    )
    .arg(
        Arg::new("list_style")
            .long("list-style")
            .value_parser(value_parser!(ListStyle))
            .default_value("sample")
            .value_name("STYLE")
            .help("Entries written to the sample list file"),
    )
    .next_help_heading("Config")
    .arg(
        Arg::new("marker")
            .short('m')
            .long("marker")
            .value_parser(value_parser!(String))
            .default_value(DEFAULT_MARKER)
            .value_name("TEXT")
            .help("Config line after which the sample list is written"),
    )
    .arg(
        Arg::new("version_key")
            .long("version-key")
            .value_parser(value_parser!(String))
            .default_value("star_version")
            .value_name("KEY")
            .help("Config key with the installed STAR version"),
    )
    .arg(
        Arg::new("index_key")
            .long("index-key")
            .value_parser(value_parser!(String))
            .default_value("star_genome_dir")
            .value_name("KEY")
            .help("Config key with the prebuilt STAR index directory (or False)"),
    )
    .arg(
        Arg::new("r1_suffix")
            .long("r1-suffix")
            .value_parser(value_parser!(String))
            .default_value("_R1_001.fastq.gz")
            .value_name("SUFFIX")
            .help("Suffix removed from read 1 file names to get the sample name"),
    )
    .arg(
        Arg::new("r2_suffix")
            .long("r2-suffix")
            .value_parser(value_parser!(String))
            .default_value("_R2_001.fastq.gz")
            .value_name("SUFFIX")
            .help("Suffix removed from read 2 file names to get the sample name"),
    )
    .next_help_heading("Operation")
    .arg(
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("info")
            .help("Set log level"),
    )
}
