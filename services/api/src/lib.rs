mod cli;
mod infra;
mod resolve;
mod routes;
mod server;

use gourmet_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
