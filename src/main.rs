use log::*;
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Starting up Localiday [{}]...", config.runtime_env());

    let purge_interval = config.session_purge_interval();
    let app_state = match AppState::init(config) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to initialize application state: {e}");
            std::process::exit(1);
        }
    };

    spawn_purge_task(app_state.clone(), purge_interval);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}

// Periodically drops idle sessions and expired pending logins.
fn spawn_purge_task(app_state: AppState, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(std::time::Duration::from_secs(1)));
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            app_state.accounts_ref().purge_expired_sessions();
            app_state.exchange_ref().pending().purge_expired();
        }
    });
}
