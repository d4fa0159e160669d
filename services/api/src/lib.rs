mod cli;
mod curate;
mod demo;
mod infra;
mod routes;
mod server;

use tool_curator::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
