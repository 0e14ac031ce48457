//! Verification service daemon.

use anyhow::Context;
use clap::Parser;
use idv_node::{init_logging, LogFormat, ServiceConfig, ShutdownController, VerificationService};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "idv-daemon", about = "Identity-verification webhook service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long, env = "IDV_CONFIG")]
    config: Option<PathBuf>,

    /// Port for the HTTP server.
    #[arg(long, env = "IDV_PORT")]
    port: Option<u16>,

    /// Data directory for the LMDB store.
    #[arg(long, env = "IDV_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IDV_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Accepted clock skew for timestamped webhooks, in seconds.
    #[arg(long, env = "IDV_REPLAY_WINDOW_SECS")]
    replay_window_secs: Option<u64>,

    #[arg(long, env = "DIDIT_API_KEY", hide_env_values = true)]
    didit_api_key: Option<String>,

    #[arg(long, env = "DIDIT_WORKFLOW_ID")]
    didit_workflow_id: Option<String>,

    #[arg(long, env = "DIDIT_WEBHOOK_SECRET", hide_env_values = true)]
    didit_webhook_secret: Option<String>,

    #[arg(long, env = "DIDIT_BASE_URL")]
    didit_base_url: Option<String>,

    #[arg(long, env = "VERIFF_API_KEY", hide_env_values = true)]
    veriff_api_key: Option<String>,

    #[arg(long, env = "VERIFF_SHARED_SECRET", hide_env_values = true)]
    veriff_shared_secret: Option<String>,

    #[arg(long, env = "VERIFF_BASE_URL")]
    veriff_base_url: Option<String>,

    #[arg(long, env = "FCM_SERVER_KEY", hide_env_values = true)]
    fcm_server_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the service.
    Run,
    /// Print the effective configuration as TOML (secrets redacted).
    PrintConfig,
}

impl Cli {
    /// Overlay CLI flags and environment variables on top of `config`.
    fn apply(&self, config: &mut ServiceConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut config.port, &self.port);
        set(&mut config.data_dir, &self.data_dir);
        set(&mut config.log_format, &self.log_format);
        set(&mut config.log_level, &self.log_level);
        set(&mut config.replay_window_secs, &self.replay_window_secs);

        set_opt(&mut config.didit.api_key, &self.didit_api_key);
        set_opt(&mut config.didit.workflow_id, &self.didit_workflow_id);
        set_opt(&mut config.didit.webhook_secret, &self.didit_webhook_secret);
        set(&mut config.didit.base_url, &self.didit_base_url);

        set_opt(&mut config.veriff.api_key, &self.veriff_api_key);
        set_opt(&mut config.veriff.webhook_secret, &self.veriff_shared_secret);
        set(&mut config.veriff.base_url, &self.veriff_base_url);

        set_opt(&mut config.push.fcm_server_key, &self.fcm_server_key);
    }
}

fn redacted(config: &ServiceConfig) -> ServiceConfig {
    let mut config = config.clone();
    for secret in [
        &mut config.didit.api_key,
        &mut config.didit.webhook_secret,
        &mut config.veriff.api_key,
        &mut config.veriff.webhook_secret,
        &mut config.push.fcm_server_key,
    ] {
        if secret.is_some() {
            *secret = Some("<redacted>".into());
        }
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            ServiceConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config file {path}"))?
        }
        None => ServiceConfig::default(),
    };
    cli.apply(&mut config);

    match cli.command {
        Command::PrintConfig => {
            println!("{}", redacted(&config).to_toml_string()?);
        }
        Command::Run => {
            let format: LogFormat = config.log_format.parse()?;
            init_logging(format, &config.log_level)?;
            tracing::info!(port = config.port, "starting verification service");

            let service = VerificationService::open(config)?;
            let shutdown = Arc::new(ShutdownController::new());
            let signal_listener = shutdown.clone();
            tokio::spawn(async move {
                signal_listener.wait_for_signal().await;
            });

            service.run(&shutdown).await?;
            tracing::info!("verification service stopped");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_style_flags_override_file_values() {
        let cli = Cli::parse_from([
            "idv-daemon",
            "--port",
            "9100",
            "--didit-webhook-secret",
            "from-env",
            "--veriff-shared-secret",
            "v-secret",
            "run",
        ]);
        let mut config = ServiceConfig::from_toml_str(
            r#"
            port = 8000
            [didit]
            webhook_secret = "from-file"
            workflow_id = "wf-file"
            "#,
        )
        .unwrap();
        cli.apply(&mut config);

        assert_eq!(config.port, 9100);
        assert_eq!(config.didit.webhook_secret.as_deref(), Some("from-env"));
        assert_eq!(config.didit.workflow_id.as_deref(), Some("wf-file"));
        assert_eq!(config.veriff.webhook_secret.as_deref(), Some("v-secret"));
    }

    #[test]
    fn redaction_hides_secrets() {
        let mut config = ServiceConfig::default();
        config.push.fcm_server_key = Some("real".into());
        let shown = redacted(&config);
        assert_eq!(shown.push.fcm_server_key.as_deref(), Some("<redacted>"));
        assert!(shown.didit.api_key.is_none());
    }
}
