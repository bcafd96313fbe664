use std::process::ExitCode;

use permcycle::selftest::{self, SelfTestConfig};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match SelfTestConfig::from_env().and_then(|config| selftest::run(&config)) {
        Ok(report) => {
            info!(seed = report.seed, rounds = report.rounds, "all checks passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "self-test failed");
            ExitCode::FAILURE
        }
    }
}
