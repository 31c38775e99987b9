use super::env_parse;

/// Settings for the "no recent client update" sweep
#[derive(Debug, Clone)]
pub struct SlaConfig {
    /// Days without a client update before a case is overdue (env: `CRM_SLA_DAYS`)
    pub days: i64,
    /// Cases notified per sweep (env: `CRM_SLA_BATCH_LIMIT`)
    pub batch_limit: u64,
    /// Seconds between scheduled sweeps; 0 disables (env: `CRM_SLA_SWEEP_INTERVAL_SECS`)
    pub sweep_interval_secs: u64,
}

impl SlaConfig {
    pub fn from_env() -> Self {
        Self {
            days: env_parse("CRM_SLA_DAYS", 7),
            batch_limit: env_parse("CRM_SLA_BATCH_LIMIT", 200),
            sweep_interval_secs: env_parse("CRM_SLA_SWEEP_INTERVAL_SECS", 0),
        }
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            days: 7,
            batch_limit: 200,
            sweep_interval_secs: 0,
        }
    }
}
