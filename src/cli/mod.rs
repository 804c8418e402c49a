mod report;

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use subtrack::services::renewal::cycle_days;
use subtrack::services::{
    Config, CycleMode, DashboardAggregator, ProviderOrder, ProviderOrdering, ProviderQuery,
    SnapshotLoader, SubscriptionOrdering, SubscriptionQuery,
};
use subtrack::types::{RecordId, Snapshot};

/// Subscription renewal and spend tracker
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Snapshot file (default: ~/.subtrack/snapshot.json)
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Config file (default: ~/.subtrack/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Reference date and renewal rule
#[derive(Args, Debug, Clone, Default)]
struct ScheduleArgs {
    /// Reference date, YYYY-MM-DD (default: today)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Step monthly/yearly cycles by calendar months
    #[arg(long)]
    calendar: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Spend totals, upcoming renewals and per-provider rollup (default)
    Summary {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Lookahead window in days
        #[arg(long, value_name = "DAYS")]
        window: Option<u32>,

        /// Provider rollup order: insertion, name or monthly
        #[arg(long)]
        sort: Option<ProviderOrder>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Renewals due within the lookahead window
    Upcoming {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Lookahead window in days
        #[arg(long, value_name = "DAYS")]
        window: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List subscriptions
    List {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Only this provider id
        #[arg(long)]
        provider: Option<String>,

        /// Only renewals within this many days
        #[arg(long, value_name = "DAYS")]
        due_in: Option<u32>,

        /// next_renewal_date, price, start_date or created_at; prefix with - to reverse
        #[arg(long, allow_hyphen_values = true)]
        ordering: Option<SubscriptionOrdering>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List providers
    Providers {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,

        /// name, -name, created_at or -created_at
        #[arg(long, allow_hyphen_values = true)]
        ordering: Option<ProviderOrdering>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the next renewal of one subscription
    Next {
        /// Subscription id
        id: String,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Check snapshot records for inconsistent values
    Validate,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Config plus loaded snapshot for one invocation
struct Session {
    config: Config,
    snapshot: Snapshot,
}

impl Session {
    fn as_of(&self, schedule: &ScheduleArgs) -> NaiveDate {
        schedule.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    fn aggregator(
        &self,
        schedule: &ScheduleArgs,
        sort: Option<ProviderOrder>,
    ) -> DashboardAggregator {
        let mode = if schedule.calendar {
            CycleMode::Calendar
        } else {
            self.config.cycle_mode
        };
        DashboardAggregator::with_calculator(mode.calculator())
            .provider_order(sort.unwrap_or(self.config.provider_order))
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        let loader = match self.snapshot.clone().or_else(|| config.snapshot_path.clone()) {
            Some(path) => SnapshotLoader::with_path(path),
            None => SnapshotLoader::new()?,
        };
        let snapshot = loader
            .load()
            .with_context(|| format!("loading snapshot {}", loader.path().display()))?;

        let session = Session { config, snapshot };
        let command = self.command.unwrap_or(Commands::Summary {
            schedule: ScheduleArgs::default(),
            window: None,
            sort: None,
            json: false,
        });

        match command {
            Commands::Summary {
                schedule,
                window,
                sort,
                json,
            } => {
                let as_of = session.as_of(&schedule);
                let window = window.unwrap_or(session.config.window_days);
                let summary = session.aggregator(&schedule, sort).summarize(
                    &session.snapshot.subscriptions,
                    &session.snapshot.providers,
                    window,
                    as_of,
                );
                if json {
                    print_json(&summary)
                } else {
                    println!("{}", report::render_summary(&summary, as_of, window));
                    Ok(())
                }
            }
            Commands::Upcoming {
                schedule,
                window,
                json,
            } => {
                let as_of = session.as_of(&schedule);
                let window = window.unwrap_or(session.config.window_days);
                let summary = session.aggregator(&schedule, None).summarize(
                    &session.snapshot.subscriptions,
                    &session.snapshot.providers,
                    window,
                    as_of,
                );
                if json {
                    print_json(&summary.upcoming)
                } else {
                    println!("{}", report::render_upcoming(&summary, as_of, window));
                    Ok(())
                }
            }
            Commands::List {
                schedule,
                provider,
                due_in,
                ordering,
                json,
            } => {
                let as_of = session.as_of(&schedule);
                let mut query = SubscriptionQuery::new().ordering(ordering.unwrap_or_default());
                if let Some(provider) = provider {
                    query = query.provider(RecordId::from(provider.as_str()));
                }
                if let Some(days) = due_in {
                    query = query.due_in_days(days);
                }
                let aggregator = session.aggregator(&schedule, None);
                let rows = query.run(
                    aggregator.calculator(),
                    &session.snapshot.subscriptions,
                    &session.snapshot.providers,
                    as_of,
                );
                if json {
                    print_json(&rows)
                } else {
                    println!("{}", report::render_subscriptions(&rows));
                    Ok(())
                }
            }
            Commands::Providers {
                search,
                ordering,
                json,
            } => {
                let mut query = ProviderQuery::new().ordering(ordering.unwrap_or_default());
                if let Some(needle) = search {
                    query = query.search(needle);
                }
                let rows = query.run(&session.snapshot.providers);
                if json {
                    print_json(&rows)
                } else {
                    println!("{}", report::render_providers(&rows));
                    Ok(())
                }
            }
            Commands::Next { id, schedule } => {
                let as_of = session.as_of(&schedule);
                let id = RecordId::from(id.as_str());
                let Some(sub) = session.snapshot.subscriptions.iter().find(|s| s.id == id) else {
                    bail!("subscription {} not found", id);
                };
                let aggregator = session.aggregator(&schedule, None);
                let next = aggregator.calculator().next_renewal(sub, as_of)?;
                println!(
                    "#{} renews on {} ({}, every {} days)",
                    sub.id,
                    next,
                    sub.billing_cycle.as_str(),
                    cycle_days(sub)?
                );
                Ok(())
            }
            Commands::Validate => {
                let mut problems = 0usize;
                for provider in &session.snapshot.providers {
                    for err in provider.validate() {
                        println!("provider #{}: {}", provider.id, err);
                        problems += 1;
                    }
                }
                for sub in &session.snapshot.subscriptions {
                    for err in sub.validate() {
                        println!("subscription #{}: {}", sub.id, err);
                        problems += 1;
                    }
                }
                if problems > 0 {
                    bail!("{} problem(s) found", problems);
                }
                println!("All records valid");
                Ok(())
            }
        }
    }
}
