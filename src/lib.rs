pub mod cli;
pub mod core;
pub mod session;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::model::{Category, ExpenditureDraft, IncomeRecord, Period, ProfileDraft};
use crate::session::Session;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Cards,
    Monthly,
    Yearly,
}

/// Changes to the income record; unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct IncomeUpdate {
    pub income: Option<f64>,
    pub goal: Option<f64>,
    pub needs: Option<f64>,
    pub wants: Option<f64>,
    pub savings: Option<f64>,
}

impl IncomeUpdate {
    pub fn apply(&self, current: IncomeRecord) -> IncomeRecord {
        IncomeRecord {
            income: self.income.unwrap_or(current.income),
            goal: self.goal.unwrap_or(current.goal),
            needs: self.needs.unwrap_or(current.needs),
            wants: self.wants.unwrap_or(current.wants),
            savings: self.savings.unwrap_or(current.savings),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    SignUp {
        profile: ProfileDraft,
        income: IncomeRecord,
    },
    Budget {
        period: Period,
        as_of: Option<NaiveDate>,
    },
    Add {
        draft: ExpenditureDraft,
        confirmed: bool,
    },
    List {
        category: Category,
        period: Period,
        as_of: Option<NaiveDate>,
    },
    Delete {
        id: Uuid,
    },
    Report {
        kind: ReportKind,
        as_of: Option<NaiveDate>,
    },
    Profile,
    EditProfile {
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    },
    EditIncome(IncomeUpdate),
}

fn config_location(config_path: Option<&str>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => AppConfig::default_config_path(),
    }
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("MoneyMap starting...");

    let path = config_location(config_path)?;
    let mut config = match (&cmd, path.exists()) {
        // Sign-up may run before setup; it writes the config it needs.
        (AppCommand::SignUp { .. }, false) => AppConfig::default(),
        _ => AppConfig::load_from_path(&path)?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;

    if let AppCommand::SignUp { profile, income } = cmd {
        let session = Session::sign_up(store, profile, income).await?;
        config.user_id = Some(session.user_id());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        config.save_to_path(&path)?;
        println!(
            "Welcome, {}! Your user id {} was saved to {}",
            session.snapshot().profile.display_name(),
            session.user_id(),
            path.display()
        );
        session.sign_out();
        return Ok(());
    }

    let user_id = config
        .user_id
        .context("No user configured; run `moneymap sign-up` first")?;

    let spinner = cli::ui::new_spinner("Loading your budget...");
    let session = Session::sign_in(store, user_id).await;
    spinner.finish_and_clear();
    let mut session = session?;

    let today = Utc::now().date_naive();
    let currency = config.currency.as_str();
    let threshold = config.overspend_threshold;

    match cmd {
        AppCommand::SignUp { .. } => unreachable!("sign-up returns early"),
        AppCommand::Budget { period, as_of } => cli::budget::run(
            session.snapshot(),
            period,
            as_of.unwrap_or(today),
            currency,
            threshold,
        )?,
        AppCommand::Add { draft, confirmed } => {
            cli::expenditure::add(&mut session, draft, confirmed, currency, threshold).await?
        }
        AppCommand::List {
            category,
            period,
            as_of,
        } => cli::expenditure::list(
            session.snapshot(),
            category,
            period,
            as_of.unwrap_or(today),
            currency,
        )?,
        AppCommand::Delete { id } => cli::expenditure::delete(&mut session, id).await?,
        AppCommand::Report { kind, as_of } => {
            let as_of = as_of.unwrap_or(today);
            match kind {
                ReportKind::Cards => cli::report::cards(session.snapshot(), as_of, currency)?,
                ReportKind::Monthly => cli::report::monthly(session.snapshot(), as_of, currency)?,
                ReportKind::Yearly => cli::report::yearly(session.snapshot(), as_of, currency)?,
            }
        }
        AppCommand::Profile => cli::profile::show(session.snapshot(), currency)?,
        AppCommand::EditProfile {
            first_name,
            last_name,
            username,
        } => {
            let current = session.snapshot().profile.clone();
            session
                .update_profile(
                    first_name.as_deref().unwrap_or(&current.first_name),
                    last_name.as_deref().unwrap_or(&current.last_name),
                    username.as_deref().unwrap_or(&current.username),
                )
                .await?;
            cli::profile::show(session.snapshot(), currency)?;
        }
        AppCommand::EditIncome(update) => {
            let income = update.apply(session.snapshot().income);
            session.update_income(income).await?;
            cli::profile::show(session.snapshot(), currency)?;
        }
    }

    session.sign_out();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_update_keeps_unset_fields() {
        let current = IncomeRecord {
            income: 3000.0,
            goal: 500.0,
            needs: 50.0,
            wants: 30.0,
            savings: 20.0,
        };
        let update = IncomeUpdate {
            wants: Some(20.0),
            savings: Some(30.0),
            ..Default::default()
        };
        let next = update.apply(current);
        assert_eq!(next.income, 3000.0);
        assert_eq!(next.goal, 500.0);
        assert_eq!(next.needs, 50.0);
        assert_eq!(next.wants, 20.0);
        assert_eq!(next.savings, 30.0);
    }

    #[test]
    fn test_config_location_prefers_explicit_path() -> Result<()> {
        let path = config_location(Some("/tmp/moneymap.yaml"))?;
        assert_eq!(path, PathBuf::from("/tmp/moneymap.yaml"));
        Ok(())
    }
}
