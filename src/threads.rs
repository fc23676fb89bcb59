use crate::config_doc::ConfigDocument;

/// Pipeline stages that declare a `threads` count in the config
pub const STAGES: [&str; 6] = [
    "cutadapt",
    "fastqc",
    "star_index",
    "star_nsupplied",
    "star_supplied",
    "stringTie",
];

#[derive(Debug, PartialEq, Eq)]
pub struct ThreadBudget {
    pub per_stage: Vec<(&'static str, usize)>,
    pub per_sample: usize,
    pub total: usize,
}

fn stage_threads(doc: &ConfigDocument, stage: &str) -> anyhow::Result<usize> {
    let field = format!("{}.threads", stage);
    let v = doc
        .nested_scalar(stage, "threads")
        .ok_or_else(|| doc.missing(&field))?;
    v.parse::<usize>()
        .map_err(|e| anyhow!("Illegal value '{}' for {} in {}: {}", v, field, doc.path().display(), e))
}

/// Sum the per stage thread counts and scale by the number of samples
///
/// Every stage must be present; a partial config is an error rather than a
/// smaller budget.
pub fn calculate_total_threads(doc: &ConfigDocument, n_samples: usize) -> anyhow::Result<ThreadBudget> {
    let mut per_stage = Vec::with_capacity(STAGES.len());
    for stage in STAGES {
        let t = stage_threads(doc, stage)?;
        trace!("{}: {} threads", stage, t);
        per_stage.push((stage, t));
    }
    let per_sample = per_stage
        .iter()
        .try_fold(0usize, |s, (_, t)| s.checked_add(*t))
        .ok_or_else(|| anyhow!("Thread count overflow"))?;
    let total = per_sample
        .checked_mul(n_samples)
        .ok_or_else(|| anyhow!("Thread count overflow"))?;
    debug!(
        "Threads per sample: {}, samples: {}, total: {}",
        per_sample, n_samples, total
    );
    Ok(ThreadBudget {
        per_stage,
        per_sample,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;

    const STAGE_CONFIG: &str = "\
cutadapt:
  threads: 2
fastqc:
  threads: 1
star_index:
  threads: 4
  sjdbOverhang: 100
star_nsupplied:
  threads: 4
star_supplied:
  threads: 4
stringTie:
  threads: 2
# Append
";

    #[test]
    fn budget_for_three_samples() {
        let doc = ConfigDocument::from_text("config.yml", STAGE_CONFIG);
        let b = calculate_total_threads(&doc, 3).unwrap();
        assert_eq!(b.per_sample, 13);
        assert_eq!(b.total, 51);
        assert_eq!(b.per_stage[2], ("star_index", 4));
    }

    #[test]
    fn zero_samples() {
        let doc = ConfigDocument::from_text("config.yml", STAGE_CONFIG);
        assert_eq!(calculate_total_threads(&doc, 0).unwrap().total, 0);
    }

    #[test]
    fn missing_stage_is_fatal() {
        let text = STAGE_CONFIG.replace("fastqc:\n  threads: 1\n", "");
        let doc = ConfigDocument::from_text("config.yml", &text);
        let err = calculate_total_threads(&doc, 3).unwrap_err();
        match err.downcast_ref::<SetupError>() {
            Some(SetupError::MissingConfigField { field, .. }) => assert_eq!(field, "fastqc.threads"),
            e => panic!("Unexpected error {:?}", e),
        }
    }

    #[test]
    fn missing_threads_field_is_fatal() {
        let text = STAGE_CONFIG.replace("stringTie:\n  threads: 2\n", "stringTie:\n  mode: fast\n");
        let doc = ConfigDocument::from_text("config.yml", &text);
        assert!(calculate_total_threads(&doc, 1).is_err());
    }

    #[test]
    fn non_numeric_threads() {
        let text = STAGE_CONFIG.replace("threads: 2\nfastqc", "threads: two\nfastqc");
        let doc = ConfigDocument::from_text("config.yml", &text);
        assert!(calculate_total_threads(&doc, 1).is_err());
    }
}
