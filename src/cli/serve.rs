//! The `serve` subcommand: the submission queue's background worker
//! plus its HTTP front-end, run side by side until the process is
//! killed.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use webqa_engine::queue::{run_worker, SubmissionQueue};

use super::env::ServeArgs;
use super::http;
use super::runtime;

pub async fn serve(args: ServeArgs) -> Result<()> {
    let queue = Arc::new(SubmissionQueue::new());
    let launcher = runtime::default_launcher();
    let registry = runtime::standard_registry();

    let worker = tokio::spawn(run_worker(queue.clone(), launcher, registry));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr, "submission queue HTTP front-end listening");

    let app = http::router(queue);
    axum::serve(listener, app).await?;

    worker.abort();
    Ok(())
}
