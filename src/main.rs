use clap::Parser;
use shopchat::app::Application;
use shopchat::cli::Args;
use shopchat::commands::create_command_registry;
use shopchat::config::Config;
use shopchat::display;
use shopchat::session::Session;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "shopchat=warn",
        1 => "shopchat=debug",
        _ => "shopchat=trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            display::display_error(&e.to_string());
            std::process::exit(1);
        }
    };
    tracing::debug!(api_url = %config.api_url, "Loaded configuration");

    let session = match Session::from_config(&config) {
        Ok(session) => session,
        Err(e) => {
            display::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let command_dispatcher = create_command_registry();
    let mut app = Application::new(args, session, command_dispatcher);

    if let Err(e) = app.run().await {
        display::display_error(&e.to_string());
        std::process::exit(1);
    }
}
