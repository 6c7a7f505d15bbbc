use std::net::TcpListener;

use actix_web::web;
use signup_forms::{listener::FormServices, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_subscriber("signup_forms", std::io::stdout);

    let config = signup_forms::config::config()?;
    let listener = TcpListener::bind(config.web.server_address())?;
    let services = web::Data::new(FormServices::from_config(&config)?);

    tracing::info!("listening on {}", listener.local_addr()?);
    signup_forms::run(listener, services)?.await?;

    Ok(())
}
