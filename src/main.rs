mod cli;
mod client;
mod config;
mod error;
mod listener;
mod onem2m;
mod probes;

use cli::Command;
use config::ProbeConfig;
use probes::{BackendCinProbe, Probe, ResponseShapeProbe, SubscriptionProbe, TriggerProbe};
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);
    let config = ProbeConfig {
        base_url: cli.cse_url.trim_end_matches('/').to_string(),
        cse_base: cli.cse_base,
        origin: cli.origin,
        timeout,
    };

    let probe: Box<dyn Probe> = match cli.command {
        Command::BackendCin {
            backend_url,
            node_id,
            token,
            content,
        } => Box::new(BackendCinProbe::new(backend_url, node_id, token, timeout).content(content)),
        Command::Response {
            vertical,
            node,
            container,
        } => Box::new(ResponseShapeProbe::new(config, vertical, node, container)),
        Command::Trigger { target, origin } => Box::new(TriggerProbe::new(config, target, origin)),
        Command::Subscription {
            vertical,
            node,
            container,
            listen_port,
            wait_secs,
        } => Box::new(
            SubscriptionProbe::new(config, vertical, node, container)
                .listen_port(listen_port)
                .wait(Duration::from_secs(wait_secs)),
        ),
    };

    log::info!("🚀 Running {} probe", probe.name());
    if let Err(e) = probe.run().await {
        println!("Error: {}", e);
    }
}
