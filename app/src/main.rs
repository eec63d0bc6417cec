use app::{config::app_config, cronjobs, database, server};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cfg = app_config();

    let db = database::db::connect(&cfg.db_url).await;

    database::db::run_migrations(&db).await;

    cronjobs::start_expired_session_purge(db.clone(), Duration::from_secs(5 * 60));

    let mut signals = Signals::new([SIGINT, SIGTERM]).expect("failed to setup signals hook");

    let db_shutdown_ref = db.clone();

    tokio::spawn(async move {
        for sig in signals.forever() {
            info!("[APP] received signal: {}, shutting down", sig);

            if let Err(e) = db_shutdown_ref.close().await {
                info!("[DB] failed to close db connection: {e}")
            }

            std::process::exit(sig)
        }
    });

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), cfg.http_port);
    info!("[WEB] listening on {}", addr);

    let server = server::controller::new(db).into_make_service_with_connect_info::<SocketAddr>();

    axum::Server::bind(&addr).serve(server).await.unwrap();
}
