//! Logging utilities

use std::{env, fs};

use color_eyre::eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    self, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, Layer,
};

use super::paths::{get_data_dir, LOG_ENV, LOG_FILE};

/// Filter used when neither `RUST_LOG` nor the project log variable is set
pub fn default_filter() -> String {
    format!(
        "{}=info,reqwest=warn,hyper=warn,hyper_util=warn",
        env!("CARGO_CRATE_NAME")
    )
}

pub fn initialize_logging() -> Result<()> {
    let directory = get_data_dir();
    fs::create_dir_all(directory.clone())?;
    let log_path = directory.join(LOG_FILE.clone());
    let log_file = fs::File::create(&log_path)?;
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG")
            .or_else(|_| env::var(LOG_ENV.clone()))
            .unwrap_or_else(|_| default_filter()),
    );
    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::EnvFilter::from_default_env());
    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
