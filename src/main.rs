//! svc-info
//!
//! Gathers inventory information from an IBM Spectrum Virtualize storage
//! system and prints it as a single JSON document.

use clap::{ArgAction, Parser};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use svc_info::{
    Error, FailureOutput, InfoConfig, InfoGatherer, RawConfig, Result, SuccessOutput,
    SvcRestClient,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// svc-info - Gather storage entity information from Spectrum Virtualize systems
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML file with default settings
    #[arg(long, short = 'c', env = "SVC_CONFIG")]
    config: Option<PathBuf>,

    /// Hostname or management IP of the storage system
    #[arg(long, env = "SVC_CLUSTERNAME")]
    clustername: Option<String>,

    /// Domain appended to the cluster name
    #[arg(long, env = "SVC_DOMAIN")]
    domain: Option<String>,

    /// REST API username
    #[arg(long, env = "SVC_USERNAME")]
    username: Option<String>,

    /// REST API password
    #[arg(long, env = "SVC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Validate the server certificate (true/false)
    #[arg(long, env = "SVC_VALIDATE_CERTS", action = ArgAction::Set)]
    validate_certs: Option<bool>,

    /// REST API port
    #[arg(long, env = "SVC_PORT")]
    port: Option<u16>,

    /// Full REST base URL, overriding cluster name, domain and port
    #[arg(long, env = "SVC_ENDPOINT")]
    endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SVC_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// Maximum time spent retrying transient failures, in seconds
    #[arg(long, env = "SVC_MAX_RETRY")]
    max_retry_secs: Option<u64>,

    /// Categories to gather (comma separated), or "all"
    #[arg(long, short = 's', env = "SVC_GATHER_SUBSET", value_delimiter = ',')]
    gather_subset: Vec<String>,

    /// Label echoed into the report
    #[arg(long)]
    name: Option<String>,

    /// Requested state (only "info" is supported)
    #[arg(long)]
    state: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "SVC_LOG_PATH")]
    log_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    /// Settings given explicitly on the command line or via environment
    fn overrides(&self) -> RawConfig {
        RawConfig {
            clustername: self.clustername.clone(),
            domain: self.domain.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            validate_certs: self.validate_certs,
            log_path: self.log_path.clone(),
            gather_subset: (!self.gather_subset.is_empty()).then(|| self.gather_subset.clone()),
            name: self.name.clone(),
            state: self.state.clone(),
            port: self.port,
            timeout_secs: self.timeout_secs,
            max_retry_secs: self.max_retry_secs,
            endpoint: self.endpoint.clone(),
        }
    }

    fn load_config(&self) -> Result<InfoConfig> {
        let base = match &self.config {
            Some(path) => RawConfig::from_file(path)?,
            None => RawConfig::default(),
        };
        base.overlay(self.overrides()).resolve()
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => return report_failure(&e),
    };

    if let Err(e) = init_logging(&args, config.log_path.as_deref()) {
        return report_failure(&e);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(category = e.failed_category(), "Gather failed: {}", e);
            report_failure(&e)
        }
    }
}

async fn run(config: InfoConfig) -> Result<()> {
    info!("Starting svc-info {}", svc_info::VERSION);
    info!("  Cluster: {}", config.connection.host());
    info!("  State: {:?}", config.state);
    info!("  Categories: {}", config.subset.len());
    debug!("Connection settings: {:?}", config.connection);

    let client = SvcRestClient::new(config.connection)?;
    let gatherer = InfoGatherer::new(client);

    let report = gatherer.gather(&config.subset).await?;
    for (category, count) in report.counts() {
        debug!("  {}: {}", category.report_key(), count);
    }
    info!(
        "Gathered {} records from {}",
        report.total_records(),
        gatherer.cluster_name()
    );

    let output = SuccessOutput::new(&report, gatherer.cluster_name(), config.name.as_deref());
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn report_failure(err: &Error) -> ExitCode {
    let output = FailureOutput::from_error(err);
    match serde_json::to_string_pretty(&output) {
        Ok(rendered) => println!("{}", rendered),
        Err(_) => println!("{{\"failed\": true, \"msg\": \"{}\"}}", err),
    }
    ExitCode::FAILURE
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args, log_path: Option<&Path>) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=info", "rustls=warn"] {
        filter = filter.add_directive(directive.parse().map_err(|e| {
            Error::Configuration(format!("invalid log directive {}: {}", directive, e))
        })?);
    }

    let (writer, ansi) = match log_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(ansi).with_writer(writer))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["svc-info"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_can_disable_certificate_validation_from_file() {
        let file = RawConfig {
            clustername: Some("svc1".into()),
            username: Some("admin".into()),
            password: Some("secret".into()),
            validate_certs: Some(true),
            ..Default::default()
        };

        let args = parse(&["--validate-certs", "false"]);
        let config = file.clone().overlay(args.overrides()).resolve().unwrap();
        assert!(!config.connection.validate_certs);

        let args = parse(&["--validate-certs", "true"]);
        assert_eq!(args.overrides().validate_certs, Some(true));

        let args = parse(&[]);
        assert_eq!(args.overrides().validate_certs, None);
        let config = file.overlay(args.overrides()).resolve().unwrap();
        assert!(config.connection.validate_certs);
    }

    #[test]
    fn test_cli_subset_and_endpoint() {
        let args = parse(&["--gather-subset", "vol,system", "--endpoint", "http://127.0.0.1:9000/rest"]);
        let overrides = args.overrides();

        assert_eq!(
            overrides.gather_subset,
            Some(vec!["vol".to_string(), "system".to_string()])
        );
        assert_eq!(overrides.endpoint.as_deref(), Some("http://127.0.0.1:9000/rest"));
        assert!(parse(&[]).overrides().gather_subset.is_none());
    }
}
