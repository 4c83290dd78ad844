use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use voltbuild::cli::field::FieldCommand;
use voltbuild::cli::{advisor, field, forecast, phase, project, rate, risk, site, task};
use voltbuild::config::Config;
use voltbuild::dashboard::{Dashboard, NewRisk};
use voltbuild::model::{
    CoolingType, NewProject, NewTask, ProjectDates, ProjectStatus, RiskStatus, Severity, TaskRole,
    TaskStatus,
};
use voltbuild::siting::{ScoringWeights, SiteFactors};
use voltbuild::store::ProjectStore;

#[derive(Parser)]
#[command(name = "voltbuild")]
#[command(about = "Mining facility construction tracking and site selection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "voltbuild.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Phase management
    Phase {
        #[command(subcommand)]
        command: PhaseCommands,
    },

    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Risk register
    Risk {
        #[command(subcommand)]
        command: RiskCommands,
    },

    /// Schedule and cost forecasts
    Forecast {
        #[command(subcommand)]
        command: ForecastCommands,
    },

    /// Health score, critical path and recommended actions
    Advise {
        /// Project ID or Name
        project: String,
    },

    /// Field records: logs, labor, punch list, RFIs, safety, utility
    Field {
        /// Project ID or Name
        project: String,
        #[command(subcommand)]
        command: FieldCommand,
    },

    /// Current CAD -> USD exchange rate
    Rate {
        /// Energy price in CAD/kWh to convert
        #[arg(long)]
        price: Option<f64>,
    },

    /// Site selection calculators
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// IT capacity in MW
        #[arg(long)]
        capacity: Option<f64>,
        /// Cooling type (air, hydro, immersion)
        #[arg(long)]
        cooling: Option<CoolingType>,
        /// Serving utility
        #[arg(long)]
        utility: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Planned start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Target completion (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Skip the default phase and task template
        #[arg(long)]
        empty: bool,
    },
    /// List projects
    List {
        /// Show every owner's projects
        #[arg(long)]
        all: bool,
    },
    /// Show project details and phases
    Show {
        /// Project ID or Name
        project: String,
    },
    /// Set project status (planning, in_progress, delayed, complete)
    Status {
        /// Project ID or Name
        project: String,
        status: ProjectStatus,
    },
    /// Edit planned or actual dates (YYYY-MM-DD); omitted dates are kept
    Dates {
        /// Project ID or Name
        project: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        actual_start: Option<NaiveDate>,
        #[arg(long)]
        actual_end: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum PhaseCommands {
    /// Append a phase to a project
    Add {
        /// Project ID or Name
        project: String,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List a project's phases
    List {
        /// Project ID or Name
        project: String,
    },
    /// Recompute a phase's progress and status from its tasks
    Recompute {
        /// Phase ID
        phase: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task to a phase
    Add {
        /// Phase ID
        phase: String,
        title: String,
        /// Responsible role (owner, engineer, contractor, utility)
        #[arg(long, default_value = "contractor")]
        role: TaskRole,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// Estimated duration in days
        #[arg(long)]
        days: Option<i64>,
        /// Mark as critical path
        #[arg(long)]
        critical: bool,
        /// Prerequisite task IDs
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },
    /// List tasks of a project, or of one phase
    List {
        /// Project ID or Name
        project: String,
        /// Restrict to one phase
        #[arg(long)]
        phase: Option<String>,
    },
    /// Set task status (not_started, in_progress, blocked, complete)
    Status {
        /// Task ID
        task: String,
        status: TaskStatus,
    },
    /// Assign a task, or clear the assignee when none is given
    Assign {
        /// Task ID
        task: String,
        assignee: Option<String>,
    },
}

#[derive(Subcommand)]
enum RiskCommands {
    /// Record a risk
    Add {
        /// Project ID or Name
        project: String,
        title: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        severity: Severity,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        mitigation: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Phase ID the risk belongs to
        #[arg(long)]
        phase: Option<String>,
    },
    /// List risks, most severe first
    List {
        /// Project ID or Name
        project: String,
    },
    /// Set risk status (open, mitigated, closed)
    Status {
        /// Project ID or Name
        project: String,
        /// Risk ID
        risk: String,
        status: RiskStatus,
    },
}

#[derive(Subcommand)]
enum ForecastCommands {
    /// Compute and save a new forecast
    Generate {
        /// Project ID or Name
        project: String,
    },
    /// Saved forecasts, newest first
    History {
        /// Project ID or Name
        project: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Change between the two latest forecasts
    Delta {
        /// Project ID or Name
        project: String,
    },
}

#[derive(Subcommand)]
enum SiteCommands {
    /// Score a site from 0-10 factor ratings
    Score {
        #[arg(long)]
        power_cost: f64,
        #[arg(long)]
        climate: f64,
        #[arg(long)]
        regulatory: f64,
        #[arg(long)]
        land: f64,
        #[arg(long)]
        infrastructure: f64,
        #[command(flatten)]
        weights: WeightArgs,
    },
    /// Rank jurisdictions under the configured or given priorities
    Recommend {
        #[command(flatten)]
        weights: WeightArgs,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// PUE by cooling type and resulting facility load
    Pue {
        /// IT capacity in MW
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long)]
        cooling: Option<CoolingType>,
    },
}

/// Per-factor weight overrides on top of the configured weights
#[derive(clap::Args)]
struct WeightArgs {
    #[arg(long = "w-power")]
    power_cost: Option<f64>,
    #[arg(long = "w-climate")]
    climate: Option<f64>,
    #[arg(long = "w-regulatory")]
    regulatory: Option<f64>,
    #[arg(long = "w-land")]
    land: Option<f64>,
    #[arg(long = "w-infrastructure")]
    infrastructure: Option<f64>,
}

impl WeightArgs {
    fn apply(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            power_cost: self.power_cost.unwrap_or(base.power_cost),
            climate: self.climate.unwrap_or(base.climate),
            regulatory: self.regulatory.unwrap_or(base.regulatory),
            land: self.land.unwrap_or(base.land),
            infrastructure: self.infrastructure.unwrap_or(base.infrastructure),
        }
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config)?;
    init_logging(&config);

    // Commands that need no database
    match &cli.command {
        Commands::Rate { price } => return rate::run(&config.currency, *price).await,
        Commands::Site { command } => {
            return match command {
                SiteCommands::Score {
                    power_cost,
                    climate,
                    regulatory,
                    land,
                    infrastructure,
                    weights,
                } => {
                    let factors = SiteFactors {
                        power_cost: *power_cost,
                        climate: *climate,
                        regulatory: *regulatory,
                        land: *land,
                        infrastructure: *infrastructure,
                    };
                    site::score(&factors, &weights.apply(config.siting.weights))
                }
                SiteCommands::Recommend { weights, limit } => {
                    site::recommend(&weights.apply(config.siting.weights), *limit)
                }
                SiteCommands::Pue { capacity, cooling } => site::pue(*capacity, *cooling),
            };
        }
        _ => {}
    }

    // Initialize store and service
    let store = ProjectStore::open(&config.database_path())?;
    let mut dash = Dashboard::new(store, config.forecast.default_horizon_days);
    let owner = config.owner_id();

    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommands::Create {
                name,
                capacity,
                cooling,
                utility,
                location,
                start,
                end,
                empty,
            } => {
                let new = NewProject {
                    owner_id: owner,
                    name,
                    capacity_mw: capacity,
                    cooling_type: cooling,
                    utility,
                    location,
                    planned_start: start,
                    planned_end: end,
                };
                project::create(&mut dash, new, !empty)?;
            }
            ProjectCommands::List { all } => {
                let filter = if all { None } else { Some(owner.as_str()) };
                project::list(&mut dash, filter)?;
            }
            ProjectCommands::Show { project } => {
                project::show(&mut dash, &project)?;
            }
            ProjectCommands::Status { project, status } => {
                project::status(&mut dash, &project, status)?;
            }
            ProjectCommands::Dates {
                project,
                start,
                end,
                actual_start,
                actual_end,
            } => {
                let dates = ProjectDates {
                    planned_start: start,
                    planned_end: end,
                    actual_start,
                    actual_end,
                };
                project::dates(&mut dash, &project, dates)?;
            }
        },
        Commands::Phase { command } => match command {
            PhaseCommands::Add {
                project,
                name,
                description,
            } => {
                phase::add(&mut dash, &project, &name, description.as_deref())?;
            }
            PhaseCommands::List { project } => {
                phase::list(&mut dash, &project)?;
            }
            PhaseCommands::Recompute { phase } => {
                phase::recompute(&mut dash, &phase)?;
            }
        },
        Commands::Task { command } => match command {
            TaskCommands::Add {
                phase,
                title,
                role,
                description,
                assignee,
                days,
                critical,
                depends_on,
            } => {
                let new = NewTask {
                    title,
                    description,
                    role,
                    assignee,
                    estimated_days: days,
                    critical_path: critical,
                    depends_on,
                };
                task::add(&mut dash, &phase, new)?;
            }
            TaskCommands::List { project, phase } => {
                task::list(&mut dash, &project, phase.as_deref())?;
            }
            TaskCommands::Status { task, status } => {
                task::status(&mut dash, &task, status)?;
            }
            TaskCommands::Assign { task, assignee } => {
                task::assign(&mut dash, &task, assignee.as_deref())?;
            }
        },
        Commands::Risk { command } => match command {
            RiskCommands::Add {
                project,
                title,
                severity,
                description,
                mitigation,
                owner: risk_owner,
                phase,
            } => {
                let new = NewRisk {
                    project_id: String::new(),
                    phase_id: phase,
                    title,
                    description,
                    severity,
                    mitigation,
                    owner: risk_owner,
                };
                risk::add(&mut dash, &project, new)?;
            }
            RiskCommands::List { project } => {
                risk::list(&mut dash, &project)?;
            }
            RiskCommands::Status {
                project,
                risk,
                status,
            } => {
                risk::status(&mut dash, &project, &risk, status)?;
            }
        },
        Commands::Forecast { command } => match command {
            ForecastCommands::Generate { project } => {
                forecast::generate(&mut dash, &project)?;
            }
            ForecastCommands::History { project, limit } => {
                forecast::history(&mut dash, &project, limit)?;
            }
            ForecastCommands::Delta { project } => {
                forecast::delta(&mut dash, &project)?;
            }
        },
        Commands::Advise { project } => {
            advisor::run(&mut dash, &project)?;
        }
        Commands::Field { project, command } => {
            field::run(&mut dash, &project, &owner, command)?;
        }
        Commands::Rate { .. } | Commands::Site { .. } => {}
    }

    let cache = dash.cache();
    if !cache.is_empty() {
        let (hits, misses) = cache.stats();
        debug!(entries = cache.len(), hits, misses, "query cache");
    }
    Ok(())
}
