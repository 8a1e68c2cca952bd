use clap::Parser;
use color_eyre::eyre::Result;

use scrollfeed::{
    app::App,
    infrastructure::{cli::Cli, config::Config},
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    let mut config = Config::new()?;
    if let Some(base_url) = &args.base_url {
        config.api.base_url = base_url.clone();
    }

    let app = App::new(config);
    let cancel_token = app.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_token.cancel();
        }
    });
    app.run(args).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
