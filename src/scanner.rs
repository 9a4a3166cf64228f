// Per-URL method scanning
//
// Runs one probe per method against a single URL, at most `concurrency`
// in flight at a time. Each finished probe is classified, passed through
// the view filter and appended to a shared list. The scan returns only
// once every probe for the URL has finished.

use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::engine::Prober;
use crate::models::{MethodResult, ProbeRequest, RequestProfile, ResultOrder, UrlResult, ViewMode};
use crate::verdict::Classifier;

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Progress hooks for callers that want to show probes as they finish.
///
/// `probe_finished` fires for every probe, including ones the view filter
/// drops. It runs on the probe's task, so implementations must be cheap.
pub trait ScanObserver: Send + Sync {
    fn url_started(&self, _url: &str) {}
    fn probe_finished(&self, _url: &str, _result: &MethodResult) {}
}

/// Observer that ignores everything
pub struct SilentObserver;

impl ScanObserver for SilentObserver {}

#[derive(Clone)]
pub struct UrlScanner {
    prober: Arc<dyn Prober>,
    classifier: Arc<Classifier>,
    concurrency: usize,
    view: ViewMode,
    order: ResultOrder,
}

impl UrlScanner {
    pub fn new(prober: Arc<dyn Prober>, classifier: Arc<Classifier>) -> Self {
        Self {
            prober,
            classifier,
            concurrency: DEFAULT_CONCURRENCY,
            view: ViewMode::All,
            order: ResultOrder::Completion,
        }
    }

    /// Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_view(mut self, view: ViewMode) -> Self {
        self.view = view;
        self
    }

    pub fn with_order(mut self, order: ResultOrder) -> Self {
        self.order = order;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn scan(
        &self,
        url: &str,
        methods: &[String],
        profile: &Arc<RequestProfile>,
        observer: &Arc<dyn ScanObserver>,
    ) -> UrlResult {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let collected: Arc<Mutex<Vec<(usize, MethodResult)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(methods.len())));
        let mut tasks = JoinSet::new();

        for (index, method) in methods.iter().enumerate() {
            // Admission happens here, before the task exists, so at most
            // `concurrency` probes are ever spawned and running.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };

            let request = ProbeRequest::new(url, method.clone(), Arc::clone(profile));
            let prober = Arc::clone(&self.prober);
            let classifier = Arc::clone(&self.classifier);
            let collected = Arc::clone(&collected);
            let observer = Arc::clone(observer);
            let view = self.view;

            tasks.spawn(async move {
                let _permit = permit;

                let outcome = prober.probe(&request).await;
                let verdict = classifier.classify(&request.method, &outcome, &request.profile.user_agent);
                let result = MethodResult::new(outcome, verdict);

                debug!(
                    url = %request.url,
                    method = %result.method,
                    status = result.status_code,
                    elapsed_ms = result.elapsed_ms,
                    vulnerable = result.is_vulnerable,
                    "probe finished"
                );
                observer.probe_finished(&request.url, &result);

                if view.retains(&result) {
                    collected.lock().await.push((index, result));
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(url, error = %e, "probe task did not complete");
            }
        }

        let mut results = std::mem::take(&mut *collected.lock().await);
        if self.order == ResultOrder::Configured {
            results.sort_by_key(|(index, _)| *index);
        }

        UrlResult {
            url: url.to_string(),
            results: results.into_iter().map(|(_, r)| r).collect(),
        }
    }
}
