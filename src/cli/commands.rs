use super::OutputFormat;
use crate::brain::provider::create_provider;
use crate::brain::verdict::{JudgeService, VerdictRequest, VerdictResult};
use crate::config::Config;
use crate::gateway;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Load configuration from a custom path or the default layers.
pub(crate) fn load_config(config_path: Option<&str>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn judge_service(config: &Config) -> Result<JudgeService> {
    let provider = create_provider(&config.judge)?;
    Ok(JudgeService::new(provider, &config.judge))
}

/// Judge a single dispute and print the verdict.
pub(crate) async fn cmd_judge(
    config: &Config,
    option_a: String,
    option_b: String,
    context: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let judge = judge_service(config)?;
    let request = VerdictRequest::new(context, option_a, option_b);

    match judge.verdict(&request).await {
        Ok(verdict) => {
            println!("{}", render_verdict(&verdict, format)?);
            Ok(())
        }
        Err(e) => {
            if let Some(raw) = e.raw() {
                eprintln!("Model output:\n{}", raw);
            }
            Err(anyhow::Error::new(e)).context(failure_hint(&request))
        }
    }
}

fn failure_hint(request: &VerdictRequest) -> String {
    format!(
        "Could not judge \"{}\" vs \"{}\"",
        request.option_a.trim(),
        request.option_b.trim()
    )
}

/// Render a verdict for the terminal.
pub(crate) fn render_verdict(verdict: &VerdictResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(verdict).context("Failed to serialize verdict")
        }
        OutputFormat::Text => Ok(format!(
            "Wrong: {}\nRight: {}\n\n{}",
            verdict.wrong, verdict.right, verdict.reason
        )),
    }
}

/// Run the HTTP gateway.
pub(crate) async fn cmd_serve(
    config: &Config,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut server = config.server.clone();
    if let Some(bind) = bind {
        server.bind = bind;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let judge = Arc::new(judge_service(config)?);
    tracing::info!(
        "Judging with model {} via {}",
        judge.model(),
        judge.provider_name()
    );
    gateway::start_server(&server, judge).await
}

/// Print the effective configuration.
pub(crate) async fn cmd_config(config: &Config, show_secrets: bool) -> Result<()> {
    println!("{}", render_config(config, show_secrets)?);
    Ok(())
}

pub(crate) fn render_config(config: &Config, show_secrets: bool) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "# System config: {}\n",
        Config::system_config_path().display()
    ));

    let api_key = match &config.judge.api_key {
        Some(key) if show_secrets => key.expose_secret().to_string(),
        Some(key) => key.masked(),
        None => "(not set)".to_string(),
    };
    out.push_str(&format!("# API key: {}\n\n", api_key));

    // SecretString always serializes redacted
    out.push_str(&toml::to_string_pretty(config).context("Failed to serialize configuration")?);
    Ok(out)
}
