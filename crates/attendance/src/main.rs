use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use qr_attendance::signing::SECRET_ENV_VAR;
use qr_attendance::{AppState, QrAuthority, SecretKey, ValidityPolicy, run};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attendance-server")]
#[command(about = "Issues and verifies signed QR attendance payloads")]
struct Args {
    #[clap(long, env = "ATTENDANCE_HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "ATTENDANCE_PORT", default_value = "3000")]
    port: u16,
    /// HMAC secret shared by signer and verifier
    #[clap(long, env = SECRET_ENV_VAR, hide_env_values = true)]
    signing_secret: Option<String>,
    /// Seconds a signed payload stays redeemable
    #[clap(long, env = "QR_VALIDITY_SECS", default_value = "300")]
    validity_secs: u32,
    /// Seconds a payload timestamp may lie in the future
    #[clap(long, env = "QR_MAX_CLOCK_SKEW_SECS", default_value = "30")]
    max_clock_skew_secs: u32,
    /// Serve without a secret; sign and verify then fail with a configuration error
    #[clap(long, env = "QR_ALLOW_MISSING_SECRET")]
    allow_missing_secret: bool,
    #[clap(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log_filter).wrap_err("invalid log filter")?)
        .with_target(false)
        .compact()
        .init();

    let secret = match args.signing_secret {
        Some(raw) => Some(SecretKey::new(raw).map_err(|e| eyre!(e))?),
        None if args.allow_missing_secret => {
            error!("{SECRET_ENV_VAR} is not set; every sign and verify request will fail");
            None
        }
        None => return Err(eyre!("{SECRET_ENV_VAR} is not set")),
    };

    let policy = ValidityPolicy {
        window: Duration::seconds(args.validity_secs.into()),
        max_clock_skew: Duration::seconds(args.max_clock_skew_secs.into()),
    };
    let authority = QrAuthority::builder(secret).policy(policy).build();

    info!(
        validity_secs = args.validity_secs,
        configured = authority.is_configured(),
        "starting attendance server"
    );

    run(
        args.host,
        args.port,
        AppState {
            authority: Arc::new(authority),
        },
    )
    .await
    .map_err(|e| eyre!("{e:#}"))
}
