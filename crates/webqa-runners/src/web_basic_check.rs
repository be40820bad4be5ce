//! WebBasicCheckRunner: extracts links from the crawled page and
//! probes the main URL plus its sub-links for HTTPS reachability and
//! HTTP status, in a bounded thread pool (`tokio::task::JoinSet`
//! running the per-link checks concurrently). The probe itself
//! is a simple external HTTP call, so this runner owns the fan-out but not a
//! real certificate-expiry inspection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinSet;
use webqa_browser::BrowserSession;
use webqa_dom::{BrowserDomCrawler, DomCrawler};
use webqa_session::{LlmConfig, ReportEntry, ResultStatus, SubTestResult, TestConfiguration, TestResult};

use crate::common::{finish, RunnerError};
use crate::runner::TestRunner;

const MAX_SUBLINKS: usize = 20;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

struct ProbeOutcome {
    url: String,
    https_ok: bool,
    status: Option<u16>,
}

pub struct WebBasicCheckRunner;

#[async_trait]
impl TestRunner for WebBasicCheckRunner {
    async fn run_test(
        &self,
        session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        _llm_config: &LlmConfig,
        target_url: &str,
    ) -> TestResult {
        let start_time = Utc::now();
        let Some(session) = session else {
            return finish(
                test_config,
                start_time,
                vec![],
                Some(RunnerError::SessionRequired(test_config.test_type).to_string()),
            );
        };

        let crawler = BrowserDomCrawler::new(session);
        let outcome = match crawler.crawl(false, false, false).await {
            Ok(o) => o,
            Err(e) => return finish(test_config, start_time, vec![], Some(e.to_string())),
        };

        let mut links: Vec<String> = outcome
            .elements
            .iter()
            .filter(|(_, el)| el.tag.as_deref() == Some("a"))
            .filter_map(|(_, el)| el.attributes.get("href").cloned())
            .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
            .collect();
        links.sort();
        links.dedup();
        links.truncate(MAX_SUBLINKS);

        let mut targets = vec![target_url.to_string()];
        targets.extend(links);

        let http = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => return finish(test_config, start_time, vec![], Some(e.to_string())),
        };

        let mut tasks = JoinSet::new();
        for url in &targets {
            let http = http.clone();
            let url = url.clone();
            tasks.spawn(async move { probe_one(&http, url).await });
        }

        let mut results = Vec::with_capacity(targets.len());
        while let Some(joined) = tasks.join_next().await {
            if let Ok(probe) = joined {
                results.push(probe);
            }
        }
        results.sort_by(|a, b| a.url.cmp(&b.url));

        let failures: Vec<String> = results
            .iter()
            .filter(|r| !r.https_ok || !matches!(r.status, Some(200..=399)))
            .map(|r| format!("{} (https_ok={}, status={:?})", r.url, r.https_ok, r.status))
            .collect();

        let status = if failures.is_empty() {
            ResultStatus::Passed
        } else if failures.len() == results.len() {
            ResultStatus::Failed
        } else {
            ResultStatus::Warning
        };

        let sub_test = SubTestResult {
            name: "链接可达性检查".to_string(),
            status,
            steps: vec![],
            report: vec![ReportEntry {
                title: "链接可达性检查结果".to_string(),
                issues: failures.clone(),
            }],
            messages: Default::default(),
            final_summary: format!("{} links checked, {} failures", results.len(), failures.len()),
            metrics: Default::default(),
        };

        finish(test_config, start_time, vec![sub_test], None)
    }
}

async fn probe_one(http: &reqwest::Client, url: String) -> ProbeOutcome {
    let https_ok = url.starts_with("https://");
    match http.get(&url).send().await {
        Ok(response) => ProbeOutcome {
            url,
            https_ok,
            status: Some(response.status().as_u16()),
        },
        Err(_) => ProbeOutcome { url, https_ok: false, status: None },
    }
}
