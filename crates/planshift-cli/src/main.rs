//! Planshift - production transfer plan workspace
//!
//! A CLI for maintaining named plans (snapshots of production and
//! facility datasets), synchronizing them into the remote store, and
//! requesting optimized transfer plans from it.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use planshift_core::ingest::{parse_plants, parse_products};
use planshift_core::remote::OptimizeConfig;
use planshift_core::session::{ConfirmationRequest, Decision, Outcome};
use planshift_core::sync::{FnSink, ProgressSink};
use planshift_core::{
    paths, CsvSource, HttpRemoteStore, RemoteConfig, SessionController, SnapshotStore,
};

/// Planshift - Transfer Plan Workspace
#[derive(Parser)]
#[command(name = "planshift")]
#[command(about = "Manage and synchronize production transfer plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Remote store base URL (overrides config and environment)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved plans, newest first
    List,

    /// Create a plan from two CSV datasets and sync it to the remote store
    Create {
        /// Plan name
        #[arg(long)]
        name: String,

        /// Production dataset (.csv)
        #[arg(long)]
        products: PathBuf,

        /// Facility dataset (.csv)
        #[arg(long)]
        plants: PathBuf,
    },

    /// Open a saved plan, replacing the remote store's contents
    Open {
        /// Plan id (see `planshift list`)
        id: String,

        /// Skip the overwrite confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Delete a saved plan from the local collection (remote untouched)
    Delete {
        /// Plan id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Re-snapshot a plan from the remote store's current records
    Refresh {
        /// Plan id; defaults to the active plan
        id: Option<String>,
    },

    /// Leave the active plan, discarding unsaved remote state
    Leave {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Ask the optimizer for a transfer plan over the current records
    Generate {
        /// Maximum one-time spend allowed ($)
        #[arg(long)]
        budget: Option<f64>,

        /// Transfer deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<chrono::NaiveDate>,

        /// Discount rate for NPV (0-1)
        #[arg(long)]
        discount_rate: Option<f64>,

        /// Optimization objective
        #[arg(long, default_value = "minimize_cost")]
        objective: String,

        /// Allow splitting production across plants
        #[arg(long)]
        fractional: bool,
    },

    /// Seed the remote store with its built-in example dataset
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RemoteConfig::load();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let remote = Arc::new(HttpRemoteStore::new(&config));
    let snapshots = SnapshotStore::open(paths::plans_file())?;
    let mut controller = SessionController::new(snapshots, remote);

    match cli.command {
        Commands::List => list_plans(&controller),
        Commands::Create {
            name,
            products,
            plants,
        } => create_plan(&mut controller, &name, &products, &plants).await?,
        Commands::Open { id, yes } => open_plan(&mut controller, &id, yes).await?,
        Commands::Delete { id, yes } => delete_plan(&mut controller, &id, yes)?,
        Commands::Refresh { id } => refresh_plan(&mut controller, id).await?,
        Commands::Leave { yes } => leave_plan(&mut controller, yes).await?,
        Commands::Generate {
            budget,
            deadline,
            discount_rate,
            objective,
            fractional,
        } => {
            let config = OptimizeConfig {
                budget_capital: budget,
                transfer_deadline: deadline,
                discount_rate,
                objective_function: objective,
                allow_fractional_assignment: fractional,
                ..Default::default()
            };
            generate(&controller, &config).await?;
        }
        Commands::Seed => {
            let summary = controller.seed_example_data().await?;
            println!(
                "{} ({} products, {} plants)",
                summary.message, summary.products_added, summary.plants_added
            );
        }
    }

    Ok(())
}

fn list_plans(controller: &SessionController) {
    let plans = controller.plans();
    if plans.is_empty() {
        println!("No plans yet. Create one with `planshift create`.");
        return;
    }

    let active_id = controller.active_plan().map(|p| p.id.clone());
    for plan in plans {
        let marker = if active_id.as_deref() == Some(plan.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}  {}  {} products, {} plants  (created {})",
            marker,
            plan.id,
            plan.name,
            plan.products_count,
            plan.plants_count,
            plan.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

async fn create_plan(
    controller: &mut SessionController,
    name: &str,
    products_path: &std::path::Path,
    plants_path: &std::path::Path,
) -> Result<()> {
    let products = parse_products(&CsvSource::from_path(products_path)?)?;
    let plants = parse_plants(&CsvSource::from_path(plants_path)?)?;
    eprintln!(
        "Parsed {} products and {} plants",
        products.len(),
        plants.len()
    );

    let mut sink = progress_sink();
    let plan = controller
        .create_plan(name, products, plants, &mut sink)
        .await?;
    eprintln!();

    println!(
        "Created plan {} ({}): {} products, {} plants synced",
        plan.name, plan.id, plan.products_count, plan.plants_count
    );
    Ok(())
}

async fn open_plan(controller: &mut SessionController, id: &str, yes: bool) -> Result<()> {
    let mut decision = decision_from_flag(yes);
    loop {
        let mut sink = progress_sink();
        match controller.open_plan(id, decision, &mut sink).await? {
            Outcome::Done(report) => {
                eprintln!();
                report_batch("products", &report.products);
                report_batch("plants", &report.plants);
                println!("Opened plan {id}");
                return Ok(());
            }
            Outcome::NeedsConfirmation(request) => {
                if !confirm(&request)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                decision = Decision::Confirmed;
            }
        }
    }
}

fn delete_plan(controller: &mut SessionController, id: &str, yes: bool) -> Result<()> {
    let mut decision = decision_from_flag(yes);
    loop {
        match controller.delete_plan(id, decision)? {
            Outcome::Done(plan) => {
                println!("Deleted plan {} ({})", plan.name, plan.id);
                return Ok(());
            }
            Outcome::NeedsConfirmation(request) => {
                if !confirm(&request)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                decision = Decision::Confirmed;
            }
        }
    }
}

async fn refresh_plan(controller: &mut SessionController, id: Option<String>) -> Result<()> {
    let plan = match id {
        Some(id) => controller.refresh_plan(&id).await?,
        None => controller.refresh_active().await?,
    };
    println!(
        "Refreshed plan {}: {} products, {} plants",
        plan.name, plan.products_count, plan.plants_count
    );
    Ok(())
}

async fn leave_plan(controller: &mut SessionController, yes: bool) -> Result<()> {
    let mut decision = decision_from_flag(yes);
    loop {
        match controller.leave_active_plan(decision).await? {
            Outcome::Done(()) => {
                println!("Left active plan.");
                return Ok(());
            }
            Outcome::NeedsConfirmation(request) => {
                if !confirm(&request)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                decision = Decision::Confirmed;
            }
        }
    }
}

async fn generate(controller: &SessionController, config: &OptimizeConfig) -> Result<()> {
    let result = controller.generate(config).await?;

    if !result.feasible {
        println!("Plan is infeasible. Constraints violated:");
        for constraint in &result.constraints_violated {
            println!("  - {constraint}");
        }
        bail!("optimizer could not produce a feasible plan");
    }

    for assignment in &result.assignments {
        println!(
            "{} -> {} ({} units/month, {:.1}% utilization, ${:.2} total)",
            assignment.product_id,
            assignment.target_plant_id,
            assignment.assigned_volume,
            assignment.utilization,
            assignment.total_cost
        );
    }
    println!(
        "Total cost ${:.2} (transfer ${:.2}, monthly ${:.2}), average utilization {:.1}%",
        result.total_cost,
        result.total_transfer_cost,
        result.total_monthly_cost,
        result.average_utilization
    );
    if let Some(seconds) = result.optimization_time_seconds {
        println!("Optimized in {seconds:.2}s");
    }
    Ok(())
}

fn decision_from_flag(yes: bool) -> Decision {
    if yes {
        Decision::Confirmed
    } else {
        Decision::Unconfirmed
    }
}

/// Progress sink rendering a single updating stderr line
fn progress_sink() -> impl ProgressSink {
    FnSink(|percent: f32, message: &str| {
        eprint!("\r[{percent:>5.1}%] {message:<50}");
        let _ = std::io::stderr().flush();
    })
}

/// Show a confirmation request and read a y/N answer from stdin
fn confirm(request: &ConfirmationRequest) -> Result<bool> {
    eprintln!("{}", request.message());
    eprint!("Proceed? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn report_batch(kind: &str, result: &planshift_core::ImportResult) {
    if result.failed > 0 {
        println!(
            "Uploaded {kind}: {} succeeded, {} failed",
            result.succeeded, result.failed
        );
        for failure in &result.failures {
            println!("  {}: {}", failure.key, failure.message);
        }
    } else {
        println!("Uploaded {kind}: {} succeeded", result.succeeded);
    }
}
