//! The `run` subcommand: one orchestration session, start to finish,
//! with no submission queue in front of it.

use anyhow::{bail, Result};
use tracing::info;
use uuid::Uuid;
use webqa_engine::config;
use webqa_scheduler::ParallelExecutor;
use webqa_session::TestSession;

use super::env::RunArgs;
use super::runtime;

pub async fn run(args: RunArgs) -> Result<()> {
    let mut cfg = config::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        cfg.target_url = url;
    }
    if cfg.target_url.trim().is_empty() {
        bail!("target_url is required: pass --url or set it in the config file");
    }

    let launcher = runtime::default_launcher();
    let registry = runtime::standard_registry();
    let executor = ParallelExecutor::new(launcher, registry, cfg.max_concurrent_tests);

    let session_id = Uuid::new_v4().to_string();
    let mut session = TestSession::new(
        session_id.clone(),
        cfg.target_url.clone(),
        cfg.llm.clone(),
        cfg.test_configurations.clone(),
    );

    info!(session_id, url = %cfg.target_url, tests = session.submission_order.len(), "starting orchestration run");
    let report = executor.execute_parallel_tests(&mut session).await?;

    println!("session: {session_id}");
    println!("json report:  {}", report.json_report_path.display());
    println!("html report:  {}", report.html_report_path.display());
    Ok(())
}
