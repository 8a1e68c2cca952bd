use std::panic;
use std::process;

use color_eyre::config::HookBuilder;
use color_eyre::eyre::Result;

use super::paths::{get_data_dir, LOG_FILE};

pub fn initialize_panic_handler() -> Result<()> {
    let log_path = get_data_dir().join(LOG_FILE.as_str());
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(format!(
            "This is a bug in {}. Please attach {} when reporting it.",
            env!("CARGO_PKG_NAME"),
            log_path.display()
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    panic::set_hook(Box::new(move |panic_info| {
        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, print_msg, Metadata};
            let meta = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                .authors(env!("CARGO_PKG_AUTHORS").replace(':', ", "));

            let file_path = handle_dump(&meta, panic_info);
            if let Err(e) = print_msg(file_path, &meta) {
                eprintln!("human-panic: printing error message to console failed: {e}");
            }
            eprintln!("{}", panic_hook.panic_report(panic_info));
        }

        let msg = panic_hook.panic_report(panic_info).to_string();
        log::error!("Panic: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        better_panic::Settings::auto()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .create_panic_handler()(panic_info);

        process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}
