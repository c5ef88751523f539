//! One scheduled run: build the report, deliver it, and never let a failure escape.

use std::{any::Any, sync::Arc};

use tokio::task::JoinError;
use tracing::{error, info};

use crate::{
    dispatcher::{ChunkOutcome, Dispatcher},
    formatting::clip,
    report::ReportBuilder,
};

const MAX_ERROR_CHARS: usize = 500;

#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Set when the report could not be built and an error notice was sent instead.
    pub error: Option<String>,
    pub outcomes: Vec<ChunkOutcome>,
}

impl RunSummary {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }
}

pub struct DigestRun {
    builder: Arc<ReportBuilder>,
    dispatcher: Arc<Dispatcher>,
}

impl DigestRun {
    pub fn new(builder: Arc<ReportBuilder>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            builder,
            dispatcher,
        }
    }

    pub async fn run_once(&self) -> RunSummary {
        info!("report run started");

        // Building runs in its own task so a panic anywhere in aggregation or
        // rendering surfaces here as a JoinError instead of killing the process.
        let builder = self.builder.clone();
        let built = tokio::spawn(async move { builder.build().await }).await;

        let summary = match built {
            Ok(report) => RunSummary {
                error: None,
                outcomes: self.dispatcher.deliver(&report).await,
            },
            Err(e) => {
                let reason = join_error_reason(e);
                error!(error = %reason, "report run failed");
                let notice = format!(
                    "❌ Error creating daily report: {}",
                    clip(&reason, MAX_ERROR_CHARS)
                );
                RunSummary {
                    error: Some(reason),
                    outcomes: self.dispatcher.deliver(&notice).await,
                }
            }
        };

        info!(
            delivered = summary.delivered(),
            parts = summary.outcomes.len(),
            failed = summary.error.is_some(),
            "report run finished"
        );
        summary
    }
}

fn join_error_reason(e: JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    panic_message(e.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}
