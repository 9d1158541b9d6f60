use bh_api::FederationApi;
use bh_app::routes::{HOME_FEATURES, HOME_INTRO, HOME_TAGLINE, PRODUCT_NAME};
use bh_app::{
    AppConfig, AppError, AppResult, Completion, ReportFlow, RequestWorker, Route, RunFlow,
    SelectedFile, UploadFlow, WorkerPoll, load_config_or_default, summarize_file,
};
use bh_core::{ModelId, format_percent};
use bh_results::{AggregateStats, Metric, MissingMetricPolicy, executive_summary};
use bh_session::Session;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "benchmark-health")]
#[command(about = "Benchmark Health CLI - Federated AI model evaluation client", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Path to a YAML config file (defaults to ./benchmark-health.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Federation server base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Directory holding the persisted session
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Leave nodes that omit a metric out of that metric's average
    #[arg(long, global = true)]
    exclude_missing: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what Benchmark Health does
    Home,
    /// Upload a model file and remember its ID
    Upload {
        /// Path to the model file (.pkl, .joblib, .h5, .pt, .pth)
        file: PathBuf,
    },
    /// Run a federation and show the dashboard
    Dashboard {
        /// Model ID (defaults to the last uploaded model)
        #[arg(long)]
        model_id: Option<String>,
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download the federation report PDF
    Reports {
        /// Model ID (defaults to the last uploaded model)
        #[arg(long)]
        model_id: Option<String>,
        /// Directory to save into (defaults to the configured download_dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Summarize a saved federation result JSON file offline
    Stats {
        /// Path to a JSON array of node results
        results_path: PathBuf,
    },
    /// Inspect or change the remembered model ID
    #[command(subcommand)]
    Session(SessionCommands),
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Print the remembered model ID
    Show,
    /// Remember a model ID
    Set {
        /// Model ID to store
        model_id: String,
    },
    /// Forget the remembered model ID
    Clear,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;
    let session = config.session();

    match cli.command {
        Commands::Home => cmd_home(),
        Commands::Upload { file } => cmd_upload(&config, &session, &file),
        Commands::Dashboard { model_id, json } => {
            cmd_dashboard(&config, &session, model_id.as_deref(), json)
        }
        Commands::Reports { model_id, out_dir } => {
            cmd_reports(&config, &session, model_id.as_deref(), out_dir)
        }
        Commands::Stats { results_path } => cmd_stats(&results_path, config.missing_metrics),
        Commands::Session(cmd) => match cmd {
            SessionCommands::Show => cmd_session_show(&session),
            SessionCommands::Set { model_id } => cmd_session_set(&session, &model_id),
            SessionCommands::Clear => cmd_session_clear(&session),
        },
    }
}

fn resolve_config(global: &GlobalArgs) -> AppResult<AppConfig> {
    let mut config = load_config_or_default(global.config.as_deref())?;
    if let Some(base_url) = &global.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(state_dir) = &global.state_dir {
        config.state_dir = state_dir.clone();
    }
    if global.exclude_missing {
        config.missing_metrics = MissingMetricPolicy::Exclude;
    }
    Ok(config)
}

fn api_client(config: &AppConfig) -> AppResult<Arc<dyn FederationApi>> {
    Ok(Arc::new(config.api_client()?))
}

fn cmd_home() -> AppResult<()> {
    println!("{} - {}", PRODUCT_NAME, HOME_TAGLINE);
    println!();
    println!("{}", HOME_INTRO);
    println!();
    for (title, blurb) in HOME_FEATURES {
        println!("  * {}: {}", title, blurb);
    }
    println!();
    println!("Views:");
    for route in Route::ALL {
        println!("  {:<12} {}", route.path(), route.title());
    }
    Ok(())
}

fn cmd_upload(config: &AppConfig, session: &Session, file: &Path) -> AppResult<()> {
    let api = api_client(config)?;
    let mut flow = UploadFlow::mount(session);
    let selected = SelectedFile::from_path(file)?;
    println!(
        "Selected: {} ({:.2} KB)",
        selected.file_name,
        selected.size_kb()
    );
    flow.select_file(selected);

    let job = flow.begin()?;
    let completion = wait_with_spinner("Uploading", move || job.execute(api.as_ref()))?;
    let failure = completion.outcome.as_ref().err().cloned();

    match flow.complete(completion, session) {
        Some(notice) if !notice.is_error() => {
            println!("✓ {}", notice.message);
            Ok(())
        }
        Some(notice) => {
            eprintln!("✗ {}", notice.message);
            Err(failure.map(AppError::from).unwrap_or(AppError::WorkerLost))
        }
        None => Err(AppError::WorkerLost),
    }
}

fn cmd_dashboard(
    config: &AppConfig,
    session: &Session,
    model_id: Option<&str>,
    json: bool,
) -> AppResult<()> {
    let api = api_client(config)?;
    let mut flow = RunFlow::mount(session, config.missing_metrics);
    if let Some(id) = model_id {
        flow.model_id_input = id.to_string();
    }

    let job = flow.begin()?;
    println!("Running federation for model: {}", job.model_id);
    let completion = wait_with_spinner("Running federation", move || job.execute(api.as_ref()))?;
    let failure = completion.outcome.as_ref().err().cloned();

    let notice = flow.complete(completion).ok_or(AppError::WorkerLost)?;
    if notice.is_error() {
        eprintln!("✗ {}", notice.message);
        return Err(failure.map(AppError::from).unwrap_or(AppError::WorkerLost));
    }

    let Some(outcome) = flow.outcome() else {
        return Err(AppError::WorkerLost);
    };
    if json {
        let text = serde_json::to_string_pretty(&outcome.snapshot())
            .map_err(|e| AppError::Results(e.to_string()))?;
        println!("{}", text);
    } else {
        println!("✓ {}", notice.message);
        println!();
        println!("Model ID: {}", outcome.model_id);
        print_stats(&outcome.stats);
    }
    Ok(())
}

fn cmd_reports(
    config: &AppConfig,
    session: &Session,
    model_id: Option<&str>,
    out_dir: Option<PathBuf>,
) -> AppResult<()> {
    let api = api_client(config)?;
    let mut config = config.clone();
    if let Some(dir) = out_dir {
        config.download_dir = dir;
    }
    let sink = config.download_sink();

    let mut flow = ReportFlow::mount(session);
    if let Some(id) = model_id {
        flow.model_id_input = id.to_string();
    }

    let job = flow.begin()?;
    println!("Downloading report for model: {}", job.model_id);
    let completion = wait_with_spinner("Downloading report", move || job.execute(api.as_ref()))?;
    let failure = completion.outcome.as_ref().err().cloned();

    let notice = flow.complete(completion, &sink).ok_or(AppError::WorkerLost)?;
    if notice.is_error() {
        eprintln!("✗ {}", notice.message);
        return Err(match failure {
            Some(err) => AppError::from(err),
            None => AppError::Download(flow.last_error().unwrap_or_default().to_string()),
        });
    }

    println!("✓ {}", notice.message);
    if let Some(saved) = flow.saved() {
        println!("  Saved to {}", saved.path.display());
    }
    Ok(())
}

fn cmd_stats(results_path: &Path, policy: MissingMetricPolicy) -> AppResult<()> {
    let stats = summarize_file(results_path, policy)?;
    print_stats(&stats);
    println!();
    println!("{}", executive_summary(&stats));
    Ok(())
}

fn cmd_session_show(session: &Session) -> AppResult<()> {
    match session.model_id() {
        Some(id) => println!("{}", id),
        None => println!("No model ID stored"),
    }
    Ok(())
}

fn cmd_session_set(session: &Session, raw: &str) -> AppResult<()> {
    let id = ModelId::parse(raw)?;
    session.set_model_id(&id);
    println!("✓ Model ID set to {}", id);
    Ok(())
}

fn cmd_session_clear(session: &Session) -> AppResult<()> {
    session.clear_model_id();
    println!("✓ Model ID cleared");
    Ok(())
}

fn print_stats(stats: &AggregateStats) {
    println!(
        "Total Nodes: {}  Evaluated Nodes: {}  Skipped Nodes: {}",
        stats.total_nodes, stats.evaluated_count, stats.skipped_count
    );

    // Averages only exist when something was evaluated.
    if let Some(averages) = stats.averages {
        println!();
        println!("Average Performance Metrics:");
        for (metric, value) in averages.iter() {
            println!("  {:<10} {}", metric.label(), percent_or_na(metric, value));
        }
    }

    if !stats.evaluated.is_empty() {
        println!();
        println!("Evaluated Nodes:");
        for node in &stats.evaluated {
            println!("  {}", node.node);
            let line = Metric::ALL
                .iter()
                .map(|&m| format!("{}={}", m.key(), percent_or_na(m, node.metrics.get(m))))
                .collect::<Vec<_>>()
                .join("  ");
            println!("    {}", line);
            if let Some(fairness) = &node.metrics.fairness_metric {
                let groups = fairness
                    .group_accuracy
                    .iter()
                    .map(|(group, acc)| format!("{}={}", group, format_percent(*acc, 2)))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("    fairness ({}): {}", fairness.attribute, groups);
            }
        }
    }

    if !stats.skipped.is_empty() {
        println!();
        println!("Skipped Nodes:");
        for node in &stats.skipped {
            println!("  {} - {}", node.node, node.reason);
        }
    }
}

fn percent_or_na(metric: Metric, value: Option<f64>) -> String {
    value
        .map(|v| format_percent(v, metric.percent_decimals()))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Run `job` on a worker thread, drawing a spinner until it finishes.
fn wait_with_spinner<T, F>(label: &str, job: F) -> AppResult<Completion<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Completion<T> + Send + 'static,
{
    let worker = RequestWorker::start(job);
    let started = Instant::now();
    let spinner = ['|', '/', '-', '\\'];
    let mut spin_idx = 0usize;

    loop {
        match worker.wait_timeout(Duration::from_millis(100)) {
            WorkerPoll::Pending => {
                print!(
                    "\r{} {}...  elapsed={:.1}s",
                    spinner[spin_idx % spinner.len()],
                    label,
                    started.elapsed().as_secs_f64()
                );
                let _ = io::stdout().flush();
                spin_idx += 1;
            }
            WorkerPoll::Done(completion) => {
                clear_progress_line();
                return Ok(completion);
            }
            WorkerPoll::Disconnected => {
                clear_progress_line();
                return Err(AppError::WorkerLost);
            }
        }
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(60));
    let _ = io::stdout().flush();
}
