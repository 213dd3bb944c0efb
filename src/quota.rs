use crate::errors::PipelineError;
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// What an account consumed. Discovery runs count as `Leads`; direct
/// programmatic calls count as `ApiCalls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Leads,
    ApiCalls,
}

/// Per-account usage limiting for discovery runs.
///
/// The pipeline asks `can_discover` before any source work starts and calls
/// `record_usage` once per run that produced at least one lead. A gate that
/// cannot answer (backing store down) should return an error; the pipeline
/// fails closed in that case.
#[async_trait]
pub trait QuotaGate: Send + Sync {
    async fn can_discover(&self, account_id: Uuid) -> Result<bool, PipelineError>;

    async fn record_usage(&self, account_id: Uuid, kind: UsageKind)
        -> Result<(), PipelineError>;
}

/// Month tag plus counters for one account.
#[derive(Debug, Clone, Copy, Default)]
struct MonthlyUsage {
    month: (i32, u32),
    leads: u32,
    api_calls: u32,
}

/// In-process quota gate with a calendar-month window.
///
/// Counters reset lazily: the first check or record in a new calendar month
/// zeroes the account's counters before applying. Good enough for the CLI
/// and for tests; deployments with shared state bring their own `QuotaGate`.
pub struct InMemoryQuota {
    monthly_limit: u32,
    usage: Mutex<HashMap<Uuid, MonthlyUsage>>,
}

impl InMemoryQuota {
    pub fn new(monthly_limit: u32) -> Self {
        Self {
            monthly_limit,
            usage: Mutex::new(HashMap::new()),
        }
    }

    fn current_month() -> (i32, u32) {
        let now = Utc::now();
        (now.year(), now.month())
    }

    fn entry_for(usage: &mut HashMap<Uuid, MonthlyUsage>, account_id: Uuid) -> &mut MonthlyUsage {
        let month = Self::current_month();
        let entry = usage.entry(account_id).or_insert(MonthlyUsage {
            month,
            ..Default::default()
        });
        if entry.month != month {
            *entry = MonthlyUsage {
                month,
                ..Default::default()
            };
        }
        entry
    }

    /// Lead-discovery runs recorded for the account this month.
    pub fn used(&self, account_id: Uuid) -> u32 {
        let mut usage = self.usage.lock().unwrap();
        Self::entry_for(&mut usage, account_id).leads
    }
}

impl Default for InMemoryQuota {
    /// The free-tier allowance: 100 discovery runs per calendar month.
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl QuotaGate for InMemoryQuota {
    async fn can_discover(&self, account_id: Uuid) -> Result<bool, PipelineError> {
        let mut usage = self.usage.lock().unwrap();
        let entry = Self::entry_for(&mut usage, account_id);
        Ok(entry.leads < self.monthly_limit)
    }

    async fn record_usage(
        &self,
        account_id: Uuid,
        kind: UsageKind,
    ) -> Result<(), PipelineError> {
        let mut usage = self.usage.lock().unwrap();
        let entry = Self::entry_for(&mut usage, account_id);
        match kind {
            UsageKind::Leads => entry.leads += 1,
            UsageKind::ApiCalls => entry.api_calls += 1,
        }
        tracing::debug!(
            "Usage for {}: {} lead run(s), {} API call(s) this month",
            account_id,
            entry.leads,
            entry.api_calls
        );
        Ok(())
    }
}
