//! Appointments Lambda - serves the same router behind API Gateway.

use lambda_http::{run, Error};

use api_gateway::{create_router, log_filter, AppState};
use shared::{Config, SqlAppointmentStore};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .json()
        .init();

    let config = Config::from_env()?;
    let store = SqlAppointmentStore::connect(&config).await?;

    run(create_router(AppState::new(store), &config.docs_dir)).await
}
