use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use moneymap::cli::ui::{StyleType, style_text};
use moneymap::core::log::init_logging;
use moneymap::core::model::{Category, ExpenditureDraft, IncomeRecord, Period, ProfileDraft};
use uuid::Uuid;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct AsOf {
    /// Day whose month/year is shown (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Monthly and yearly usage plus savings goal progress
    Cards(AsOf),
    /// Every expenditure of the month
    Monthly(AsOf),
    /// Month by month totals for the year
    Yearly(AsOf),
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Create a profile and income record, and remember the new user
    SignUp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Monthly income
        #[arg(long)]
        income: f64,
        /// Monthly savings goal
        #[arg(long)]
        goal: f64,
        #[arg(long, default_value_t = 50.0)]
        needs: f64,
        #[arg(long, default_value_t = 30.0)]
        wants: f64,
        #[arg(long, default_value_t = 20.0)]
        savings: f64,
    },
    /// Display the needs/wants/savings breakdown
    Budget {
        /// monthly or yearly
        #[arg(default_value = "monthly")]
        period: Period,
        #[command(flatten)]
        as_of: AsOf,
    },
    /// Record an expenditure
    Add {
        /// needs, wants or savings
        category: Category,
        title: String,
        cost: f64,
        #[arg(short, long)]
        description: Option<String>,
        /// Record the purchase even if it triggers a warning
        #[arg(short, long)]
        yes: bool,
    },
    /// List expenditures of a category
    List {
        /// needs, wants or savings
        category: Category,
        /// monthly or yearly
        #[arg(default_value = "monthly")]
        period: Period,
        #[command(flatten)]
        as_of: AsOf,
    },
    /// Delete an expenditure by id
    Delete { id: Uuid },
    /// Display reports
    #[command(subcommand)]
    Report(ReportCommand),
    /// Display the signed-in profile
    Profile,
    /// Change name or username
    EditProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Change income, goal or allocation percentages
    EditIncome {
        #[arg(long)]
        income: Option<f64>,
        #[arg(long)]
        goal: Option<f64>,
        #[arg(long)]
        needs: Option<f64>,
        #[arg(long)]
        wants: Option<f64>,
        #[arg(long)]
        savings: Option<f64>,
    },
}

impl From<Commands> for moneymap::AppCommand {
    fn from(cmd: Commands) -> moneymap::AppCommand {
        use moneymap::{AppCommand, IncomeUpdate, ReportKind};

        match cmd {
            Commands::SignUp {
                username,
                first_name,
                last_name,
                email,
                income,
                goal,
                needs,
                wants,
                savings,
            } => AppCommand::SignUp {
                profile: ProfileDraft {
                    username,
                    first_name,
                    last_name,
                    email,
                },
                income: IncomeRecord {
                    income,
                    goal,
                    needs,
                    wants,
                    savings,
                },
            },
            Commands::Budget { period, as_of } => AppCommand::Budget {
                period,
                as_of: as_of.date,
            },
            Commands::Add {
                category,
                title,
                cost,
                description,
                yes,
            } => AppCommand::Add {
                draft: ExpenditureDraft {
                    category,
                    title,
                    cost,
                    description,
                },
                confirmed: yes,
            },
            Commands::List {
                category,
                period,
                as_of,
            } => AppCommand::List {
                category,
                period,
                as_of: as_of.date,
            },
            Commands::Delete { id } => AppCommand::Delete { id },
            Commands::Report(report) => {
                let (kind, as_of) = match report {
                    ReportCommand::Cards(as_of) => (ReportKind::Cards, as_of),
                    ReportCommand::Monthly(as_of) => (ReportKind::Monthly, as_of),
                    ReportCommand::Yearly(as_of) => (ReportKind::Yearly, as_of),
                };
                AppCommand::Report {
                    kind,
                    as_of: as_of.date,
                }
            }
            Commands::Profile => AppCommand::Profile,
            Commands::EditProfile {
                first_name,
                last_name,
                username,
            } => AppCommand::EditProfile {
                first_name,
                last_name,
                username,
            },
            Commands::EditIncome {
                income,
                goal,
                needs,
                wants,
                savings,
            } => AppCommand::EditIncome(IncomeUpdate {
                income,
                goal,
                needs,
                wants,
                savings,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => moneymap::cli::setup::setup_at_path(path),
            None => moneymap::cli::setup::setup(),
        },
        Some(cmd) => moneymap::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
        eprintln!("{}", style_text(&format!("Error: {e:#}"), StyleType::Error));
        std::process::exit(1);
    }
    Ok(())
}
