use std::{
	fs::{self, OpenOptions},
	path::PathBuf,
	sync::{Arc, Mutex},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mo_core::{
	config::SyncConfig,
	infra::{
		db::{Database, SqlStore},
		lock::DbJobLock,
		registry::SdrsApiClient,
	},
	service::{SyncJob, SyncScheduler},
	store::SyncStore,
	sync::{PartitionOutcome, SyncOrchestrator, SyncReport},
};
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mo-server", about = "Keeps local offence data in sync with SDRS", version)]
struct Cli {
	/// Path to the TOML config file
	#[arg(short, long, env = "MO_CONFIG")]
	config: Option<PathBuf>,

	/// Print reports and status as JSON
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
	/// Run the scheduled jobs until Ctrl-C (default)
	Run,
	/// Wipe and reload every partition once
	FullLoad,
	/// Refresh changed partitions once
	Update,
	/// Print the load status of every partition
	Status,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config =
		SyncConfig::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
	init_logging(&config)?;

	let db = Database::connect(&config.database_url)
		.await
		.with_context(|| format!("Failed to connect to {}", config.database_url))?;
	db.migrate().await.context("Failed to run database migrations")?;

	let store = Arc::new(SqlStore::new(db.conn().clone()));
	let registry =
		Arc::new(SdrsApiClient::new(&config.registry).context("Failed to build registry client")?);
	info!(endpoint = registry.endpoint(), "Using SDRS registry");

	let orchestrator = SyncOrchestrator::new(registry, store.clone())
		.with_max_concurrent_partitions(config.max_concurrent_partitions);
	let scheduler = SyncScheduler::new(
		Arc::new(orchestrator),
		Arc::new(DbJobLock::new(db.conn().clone())),
		config.schedule.clone(),
		config.lock,
	);

	match cli.command.unwrap_or(Command::Run) {
		Command::Run => run(scheduler).await,
		Command::FullLoad => run_once(&scheduler, SyncJob::FullLoad, cli.json).await,
		Command::Update => run_once(&scheduler, SyncJob::Update, cli.json).await,
		Command::Status => print_status(store.as_ref(), cli.json).await,
	}
}

fn init_logging(config: &SyncConfig) -> Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&config.log_level))
		.with_context(|| format!("Invalid log level {:?}", config.log_level))?;

	let console_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(false);

	let file_layer = match &config.log_file {
		Some(path) => {
			if let Some(parent) = path.parent() {
				fs::create_dir_all(parent)?;
			}
			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(path)
				.with_context(|| format!("Failed to open log file {}", path.display()))?;

			Some(
				fmt::layer()
					.with_writer(Mutex::new(file))
					.with_ansi(false)
					.with_target(true)
					.with_line_number(true),
			)
		}
		None => None,
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(console_layer)
		.with(file_layer)
		.init();

	Ok(())
}

async fn run(scheduler: SyncScheduler) -> Result<()> {
	let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

	tokio::spawn(async move {
		match tokio::signal::ctrl_c().await {
			Ok(()) => info!("Received Ctrl-C, shutting down"),
			Err(e) => error!(?e, "Failed to listen for Ctrl-C, shutting down"),
		}
		let _ = shutdown_tx.send(());
	});

	scheduler.run(shutdown_rx).await;

	Ok(())
}

async fn run_once(scheduler: &SyncScheduler, job: SyncJob, json: bool) -> Result<()> {
	let Some(report) = scheduler
		.run_job(job)
		.await
		.with_context(|| format!("{job} run failed"))?
	else {
		warn!(%job, "Job is locked by another instance, nothing was run");
		return Ok(());
	};

	print_report(&report, json)?;

	let failed = report.failures().count();
	if failed > 0 {
		bail!("{job} finished with {failed} failed partition(s)");
	}

	Ok(())
}

fn print_report(report: &SyncReport, json: bool) -> Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(report)?);
		return Ok(());
	}

	println!("{} run at {}", report.load_type, report.load_date);
	for (partition, outcome) in &report.outcomes {
		let line = match outcome {
			PartitionOutcome::Loaded { records } => format!("loaded {records}"),
			PartitionOutcome::NoCache => "no cache".to_string(),
			PartitionOutcome::Failed { reason } => format!("FAILED: {reason}"),
			PartitionOutcome::Unrecorded { reason } => format!("NOT RECORDED: {reason}"),
		};
		println!("  {partition}  {line}");
	}
	println!("{} offence(s) written", report.records_written());

	Ok(())
}

async fn print_status(store: &dyn SyncStore, json: bool) -> Result<()> {
	let statuses = store
		.list_load_statuses()
		.await
		.context("Failed to read load statuses")?;

	if json {
		println!("{}", serde_json::to_string_pretty(&statuses)?);
		return Ok(());
	}

	let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

	println!(
		"{:<9} {:<8} {:<10} {:<20} {:<20}",
		"PARTITION", "STATUS", "LOAD TYPE", "LAST ATTEMPT", "LAST SUCCESS"
	);
	for status in statuses {
		println!(
			"{:<9} {:<8} {:<10} {:<20} {:<20}",
			status.partition.to_string(),
			show(status.status.map(|s| s.to_string())),
			show(status.load_type.map(|t| t.to_string())),
			show(status.load_date.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())),
			show(
				status
					.last_successful_load_date
					.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
			),
		);
	}

	Ok(())
}
