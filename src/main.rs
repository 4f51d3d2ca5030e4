use cardgate::adapters::inbound::http::{serve, shutdown_signal};
use cardgate::app::App;
use cardgate::config::Config;
use dotenv::dotenv;
use std::process::ExitCode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(why) => {
            log::error!("Invalid configuration - {why}");
            return ExitCode::FAILURE;
        }
    };

    let address = config.socket_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(why) => {
            log::error!("Failed to bind {address} - {why}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(why) = serve(listener, App::new(config), shutdown_signal()).await {
        log::error!("Server stopped - {why}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
