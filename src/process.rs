use std::fmt;

use anyhow::Context;

use crate::{
    cli::Config,
    config_doc::{ConfigDocument, ConfigLock},
    discover::search_fastq_files,
    layout::PipelineLayout,
    relocate::{move_fastq_files, RelocationSummary},
    samples::{get_sample_names, write_sample_list, SampleNameSet},
    threads::{calculate_total_threads, ThreadBudget},
    version::{check_star_version, VersionCheck},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    DirsReady,
    FilesDiscovered,
    FilesMoved,
    NamesResolved,
    ConfigRewritten,
    ThreadsComputed,
    VersionChecked,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::DirsReady => "directories ready",
            Self::FilesDiscovered => "FASTQ files discovered",
            Self::FilesMoved => "FASTQ files moved",
            Self::NamesResolved => "sample names resolved",
            Self::ConfigRewritten => "config rewritten in memory",
            Self::ThreadsComputed => "threads computed",
            Self::VersionChecked => "STAR version checked",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

fn reached(stage: Stage) {
    info!("Setup: {}", stage)
}

#[derive(Debug)]
pub struct SetupOutcome {
    pub relocation: RelocationSummary,
    pub samples: SampleNameSet,
    pub budget: ThreadBudget,
    pub version: VersionCheck,
}

/// Run all setup steps in order
///
/// Steps up to the FASTQ move change the filesystem as they go and are not
/// rolled back. The config file is only replaced once the thread budget and
/// STAR version check have succeeded on the rewritten document, and the
/// config lock is held from the read until the new file is in place.
pub fn setup(cfg: &Config) -> anyhow::Result<SetupOutcome> {
    let root = cfg
        .root()
        .canonicalize()
        .with_context(|| format!("Could not resolve working directory {}", cfg.root().display()))?;
    let layout = PipelineLayout::new(root);
    layout.create_directories()?;
    reached(Stage::DirsReady);

    let groups = search_fastq_files(layout.root());
    if groups.is_empty() {
        info!("No FASTQ files found under {}", layout.root().display());
    } else {
        info!(
            "Found {} R1 and {} R2 FASTQ files",
            groups.r1.len(),
            groups.r2.len()
        );
    }
    reached(Stage::FilesDiscovered);

    let raw_dir = layout.raw_dir();
    let relocation = move_fastq_files(&groups, &raw_dir)?;
    info!(
        "Moved {} files to {} ({} already in place)",
        relocation.moved,
        raw_dir.display(),
        relocation.skipped
    );
    reached(Stage::FilesMoved);

    let samples = get_sample_names(cfg.sample_source(), &raw_dir, cfg.suffixes())?;
    if let Some(path) = cfg.sample_list() {
        write_sample_list(path, cfg.list_style(), &samples, &raw_dir)?;
    }
    reached(Stage::NamesResolved);

    let lock = ConfigLock::acquire(cfg.config_file())?;
    let doc = ConfigDocument::read(cfg.config_file())?
        .with_samples(&samples, cfg.marker());
    reached(Stage::ConfigRewritten);

    let budget = calculate_total_threads(&doc, samples.len())?;
    reached(Stage::ThreadsComputed);

    let version = check_star_version(&doc, cfg.version_keys())?;
    reached(Stage::VersionChecked);

    doc.commit(&lock)
        .with_context(|| format!("Failed to update {}", cfg.config_file().display()))?;
    drop(lock);
    info!(
        "Wrote {} samples to {}",
        samples.len(),
        cfg.config_file().display()
    );
    reached(Stage::Done);

    Ok(SetupOutcome {
        relocation,
        samples,
        budget,
        version,
    })
}

pub fn recommended_command(total_threads: usize) -> String {
    format!(
        "srun --partition=celltypes --mem=200g --time=24:00:00 snakemake --cores {} -s main.smk",
        total_threads
    )
}

pub fn run_setup(cfg: &Config) -> anyhow::Result<()> {
    let out = setup(cfg)?;
    debug!("Threads per stage: {:?}", out.budget.per_stage);
    if let VersionCheck::Matched(v) = &out.version {
        debug!("STAR index built with version {}", v)
    }
    info!(
        "{} samples x {} threads per sample = {} threads",
        out.samples.len(),
        out.budget.per_sample,
        out.budget.total
    );
    println!("Setup is Complete...continue to run snakemake pipeline with the following command:\n");
    println!("{}\n", recommended_command(out.budget.total));
    println!("Or\n");
    println!("sbatch run.sh");
    Ok(())
}
