mod cli;
mod dashboard;
mod infra;
mod routes;
mod server;

use property_pulse::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
