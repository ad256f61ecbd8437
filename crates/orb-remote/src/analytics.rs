//! Analytics sinks: Supabase `site_events` inserts, or nothing at all

use crate::provider::{ensure_success, AnalyticsSink, RemoteResult, WarnOnce};
use crate::types::{SiteEventRecord, DEFAULT_SITE_NAME};
use orb_core::AnalyticsEvent;
use reqwest::Client;
use tracing::debug;

pub struct SupabaseAnalytics {
    client: Client,
    base_url: String,
    anon_key: String,
    site_name: String,
    page_url: Option<String>,
    user_agent: String,
    warned: WarnOnce,
}

impl SupabaseAnalytics {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            page_url: None,
            user_agent: format!("orbstare/{}", env!("CARGO_PKG_VERSION")),
            warned: WarnOnce::default(),
        }
    }

    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    pub fn with_page_url(mut self, url: Option<String>) -> Self {
        self.page_url = url;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.anon_key.is_empty()
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/site_events", self.base_url)
    }

    /// Build the row for an event, stamped with the current time.
    pub fn record_for(&self, event: &AnalyticsEvent) -> SiteEventRecord {
        SiteEventRecord {
            site_name: self.site_name.clone(),
            event_name: event.name.as_str().to_string(),
            event_data: event.data.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            user_agent: self.user_agent.clone(),
            url: self.page_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for SupabaseAnalytics {
    async fn record(&self, event: AnalyticsEvent) -> RemoteResult<()> {
        if !self.is_configured() {
            self.warned
                .warn("Supabase not configured, skipping event tracking");
            return Ok(());
        }

        let row = self.record_for(&event);
        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        ensure_success("site_events", response).await?;
        debug!("tracked {}", row.event_name);
        Ok(())
    }
}

/// Drops every event after logging it at debug level.
#[derive(Debug, Default)]
pub struct NullAnalytics;

#[async_trait::async_trait]
impl AnalyticsSink for NullAnalytics {
    async fn record(&self, event: AnalyticsEvent) -> RemoteResult<()> {
        debug!("analytics disabled, dropping {}", event.name);
        Ok(())
    }
}
