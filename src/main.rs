use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rideshare::config::AppConfig;
use rideshare::error::AppError;
use rideshare::models::{
    ride::{Location, RideId},
    search::SearchQuery,
    user::UserId,
};
use rideshare::state::AppState;
use serde::Serialize;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "rideshare",
    about = "Search and schedule checks over a ride seed file"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank open rides for a desired trip
    Search {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Desired departure, RFC 3339
        #[arg(long)]
        depart: DateTime<Utc>,
        /// Desired arrival, RFC 3339
        #[arg(long)]
        arrive: DateTime<Utc>,
        #[arg(long)]
        requester: i64,
    },
    /// Check whether a user is busy during a ride
    Busy {
        #[arg(long)]
        ride: i64,
        #[arg(long)]
        user: i64,
    },
    /// List a user's rides with their role
    Rides {
        #[arg(long)]
        user: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let state = AppState::load(config).await?;

    if let Err(err) = run(&state, cli.command).await {
        error!("command failed: {err}");
        return Err(err);
    }
    Ok(())
}

async fn run(state: &AppState, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Search {
            from,
            to,
            depart,
            arrive,
            requester,
        } => {
            let query = SearchQuery {
                departure: Location::named(from),
                destination: Location::named(to),
                departure_time: depart,
                arrival_time: arrive,
                requester: UserId(requester),
            };
            print_json(&state.rides.search(&query).await?)
        }
        Commands::Busy { ride, user } => {
            let busy = state.rides.is_user_busy(RideId(ride), UserId(user)).await?;
            print_json(&serde_json::json!({ "ride": ride, "user": user, "busy": busy }))
        }
        Commands::Rides { user } => print_json(&state.rides.rides_for_user(UserId(user)).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value).map_err(|err| AppError::Other(err.into()))?;
    println!("{out}");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rideshare=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
