// Campaign runner
// Scans URLs one after another and assembles the final report

use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::info;

use crate::models::{CampaignReport, RequestProfile, ToolMetadata};
use crate::scanner::{ScanObserver, UrlScanner};

pub struct Campaign {
    scanner: UrlScanner,
    profile: Arc<RequestProfile>,
    tool: ToolMetadata,
}

impl Campaign {
    pub fn new(scanner: UrlScanner, profile: RequestProfile) -> Self {
        Self {
            scanner,
            profile: Arc::new(profile),
            tool: ToolMetadata::default(),
        }
    }

    pub fn with_tool(mut self, tool: ToolMetadata) -> Self {
        self.tool = tool;
        self
    }

    /// URL N+1 is not started until every probe of URL N has finished.
    pub async fn run(
        &self,
        urls: &[String],
        methods: &[String],
        observer: Arc<dyn ScanObserver>,
    ) -> CampaignReport {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        info!(
            urls = urls.len(),
            methods = methods.len(),
            concurrency = self.scanner.concurrency(),
            "starting campaign"
        );

        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            info!(url = %url, "scanning url");
            observer.url_started(url);
            let url_result = self.scanner.scan(url, methods, &self.profile, &observer).await;
            info!(url = %url, kept = url_result.results.len(), "url scan complete");
            results.push(url_result);
        }

        info!(urls = results.len(), "campaign complete");
        CampaignReport {
            tool: self.tool.clone(),
            timestamp,
            results,
        }
    }
}
