//! `nbfp`: submit notebooks and audit an assignment for potential cheating.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nbfp::{
    CellPolicy, FailureMode, FingerprintStore, NbfpConfig, StoreConfig, SubmissionIdentity,
    audit_assignment, check_required_methods, is_advanced_comparison_available,
    submit_notebook_path, write_audit_reports,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nbfp", version, about = "Notebook submission fingerprinting and plagiarism audit")]
struct Cli {
    /// YAML configuration file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fingerprint a notebook and store it as a submission archive.
    Submit(SubmitArgs),
    /// Compare every pair of submissions for an assignment and write a report.
    Compare(CompareArgs),
    /// Report which required method signatures a stored submission implements.
    CheckMethods(CheckMethodsArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    student_id: String,
    #[arg(long, default_value = "./main.ipynb")]
    notebook: PathBuf,
    #[arg(long, default_value = "decision-tree")]
    assignment: String,
    /// Archive root; overrides `store.root` from the config.
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// Extra files packaged with the notebook. Missing files are skipped.
    #[arg(long = "artifact", value_name = "PATH")]
    artifacts: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Positional,
    VectorSpace,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[arg(long, default_value = "decision-tree")]
    assignment: String,
    #[arg(long)]
    store_dir: Option<PathBuf>,
    #[arg(long, default_value = "comparison_report.csv")]
    output: PathBuf,
    /// Also write `<output stem>_verbose.json` with per-pair details.
    #[arg(long)]
    verbose: bool,
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
    /// Overall similarity above which a pair is flagged.
    #[arg(long)]
    threshold: Option<f64>,
    /// Flagged fraction above which all flags are suppressed.
    #[arg(long)]
    suppression: Option<f64>,
    /// Skip pairs that fail to load or score instead of aborting.
    #[arg(long)]
    best_effort: bool,
    /// Score pairs on all cores.
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug)]
struct CheckMethodsArgs {
    #[arg(long)]
    student_id: String,
    #[arg(long, default_value = "decision-tree")]
    assignment: String,
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// Required signature, e.g. `--method "def fit(self, X, y):"`. Repeatable.
    #[arg(long = "method", value_name = "SIGNATURE", required = true)]
    methods: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => NbfpConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NbfpConfig::default(),
    };
    init_tracing(&config.log_level, cli.log_json);

    match cli.command {
        Command::Submit(args) => submit(&config, args),
        Command::Compare(args) => compare(&config, args),
        Command::CheckMethods(args) => check_methods(&config, args),
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(
    config: &NbfpConfig,
    store_dir: Option<PathBuf>,
) -> anyhow::Result<Box<dyn FingerprintStore>> {
    let store_config = match store_dir {
        Some(root) => StoreConfig::archive(root),
        None => config.store_config(),
    };
    store_config
        .build()
        .with_context(|| format!("opening store {store_config:?}"))
}

fn submit(config: &NbfpConfig, args: SubmitArgs) -> anyhow::Result<()> {
    let store = open_store(config, args.store_dir)?;
    let identity = SubmissionIdentity::new(args.student_id, args.assignment)?;
    let artifacts: Vec<PathBuf> = args
        .artifacts
        .into_iter()
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                tracing::warn!(path = %path.display(), "artifact_missing_skipped");
            }
            exists
        })
        .collect();

    println!(
        "Submitting {} assignment for student {}",
        identity.assignment, identity.student_id
    );
    let (fingerprint, handle) = submit_notebook_path(
        store.as_ref(),
        &identity,
        &args.notebook,
        &artifacts,
        &config.canonicalize_config(),
    )?;
    if let Some(path) = &handle.path {
        println!("Archive written to {}", path.display());
    }
    println!(
        "Submission complete: {} code cells, {} methods, {} estimations",
        fingerprint.cell_count(),
        fingerprint.implemented_methods.len(),
        fingerprint.estimations.len()
    );
    Ok(())
}

fn compare(config: &NbfpConfig, args: CompareArgs) -> anyhow::Result<()> {
    let mut batch = config.batch_config();
    if let Some(policy) = args.policy {
        batch.score.cell_policy = match policy {
            PolicyArg::Positional => CellPolicy::Positional,
            PolicyArg::VectorSpace => CellPolicy::VectorSpace,
        };
    }
    if batch.score.cell_policy == CellPolicy::VectorSpace && !is_advanced_comparison_available() {
        bail!("vector-space comparison is not available in this build (enable the `tfidf` feature)");
    }
    if let Some(threshold) = args.threshold {
        batch.cheating_threshold = threshold;
    }
    if let Some(suppression) = args.suppression {
        batch.suppression_fraction = suppression;
    }
    if args.best_effort {
        batch.failure_mode = FailureMode::SkipFailed;
    }
    batch.parallel |= args.parallel;

    let store = open_store(config, args.store_dir)?;
    let report = audit_assignment(store.as_ref(), &args.assignment, &batch)?;
    let detail = write_audit_reports(&report, &args.output, args.verbose)?;

    println!(
        "Compared {} pairs for {}; report saved to {}",
        report.total_pairs(),
        args.assignment,
        args.output.display()
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} pairs that could not be scored", report.skipped.len());
    }
    if report.suppress {
        println!(
            "Note: potential cheating has been ignored because {:.0}% of pairs exceeded the threshold.",
            report.cheating_fraction * 100.0
        );
    }
    if let Some(path) = detail {
        println!("Verbose comparison report saved to {}", path.display());
    }
    Ok(())
}

fn check_methods(config: &NbfpConfig, args: CheckMethodsArgs) -> anyhow::Result<()> {
    let store = open_store(config, args.store_dir)?;
    let identity = SubmissionIdentity::new(args.student_id, args.assignment)?;
    let report = check_required_methods(store.as_ref(), &identity, &args.methods)?;
    for (signature, present) in &report {
        let mark = if *present { "ok" } else { "MISSING" };
        println!("{mark:>7}  {signature}");
    }
    let missing = report.values().filter(|present| !**present).count();
    if missing > 0 {
        bail!("{missing} required method(s) missing for {identity}");
    }
    Ok(())
}
