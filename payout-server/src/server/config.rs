/// Server configuration, sourced from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,

    /// Shared secret the cron caller presents on the batch trigger
    pub cron_secret: String,

    /// Stripe API key for the transfer client
    pub stripe_secret_key: String,

    /// Percent of each commission retained by the platform (default 20)
    pub platform_fee_rate: f64,

    /// Platform ledger currency for transfers
    pub payout_currency: String,

    /// Wire timeout for transfer calls (milliseconds)
    pub transfer_timeout_ms: u64,

    /// Hour of day (UTC) the daily payout scheduler fires
    pub payout_run_hour: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/referra".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            cron_secret: std::env::var("CRON_SECRET").unwrap_or_default(),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            platform_fee_rate: std::env::var("PLATFORM_FEE_RATE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(20.0),
            payout_currency: std::env::var("PAYOUT_CURRENCY").unwrap_or_else(|_| "usd".into()),
            transfer_timeout_ms: std::env::var("TRANSFER_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15_000),
            payout_run_hour: std::env::var("PAYOUT_RUN_HOUR")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|h| *h < 24)
                .unwrap_or(6),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
