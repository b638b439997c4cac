//! Station configuration: command-line flags with environment fallbacks.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use lotcheck_core::{Client, ClientDirectory};
use lotcheck_report::ReportOptions;
use lotcheck_sync::http::{DEFAULT_LOG_TABLE, DEFAULT_ORDER_ENDPOINT, DEFAULT_TENANT};
use lotcheck_sync::{ConfirmationLog, ConfirmationSink, DiscardLog, OrderClient};

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Shipping-order endpoint of the warehouse API.
    #[arg(long, env = "LOTCHECK_ORDER_ENDPOINT", default_value = DEFAULT_ORDER_ENDPOINT, global = true)]
    pub order_endpoint: String,

    /// Tenant id sent with every order lookup.
    #[arg(long, env = "LOTCHECK_TENANT", default_value = DEFAULT_TENANT, global = true)]
    pub tenant: String,

    /// Base URL of the confirmation log service. Logging is off when unset.
    #[arg(long, env = "LOTCHECK_LOG_URL", global = true)]
    pub log_url: Option<String>,

    /// API key for the confirmation log service.
    #[arg(long, env = "LOTCHECK_LOG_KEY", hide_env_values = true, global = true)]
    pub log_key: Option<String>,

    /// Table receiving confirmation records.
    #[arg(long, env = "LOTCHECK_LOG_TABLE", default_value = DEFAULT_LOG_TABLE, global = true)]
    pub log_table: String,

    /// Extra client directory entries.
    #[arg(
        long = "client-entry",
        value_name = "NAME=OWNER",
        env = "LOTCHECK_CLIENTS",
        value_delimiter = ',',
        global = true
    )]
    pub client_entries: Vec<String>,

    /// Client selected at startup (defaults to the first directory entry).
    #[arg(long, env = "LOTCHECK_CLIENT", global = true)]
    pub client: Option<String>,

    /// Directory reports are written to.
    #[arg(long, env = "LOTCHECK_OUT_DIR", default_value = ".", global = true)]
    pub out_dir: PathBuf,

    /// PNG or JPEG logo for the report header (defaults to the built-in logo).
    #[arg(long, env = "LOTCHECK_LOGO", global = true)]
    pub logo: Option<PathBuf>,

    /// Keep the order loaded after its report is exported.
    #[arg(long, global = true)]
    pub keep_after_export: bool,

    /// Do not ring the terminal bell on failures.
    #[arg(long, global = true)]
    pub no_bell: bool,

    /// Log at info level instead of warnings only.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Config {
    pub fn directory(&self) -> anyhow::Result<ClientDirectory> {
        let entries = self
            .client_entries
            .iter()
            .map(|e| e.parse::<Client>())
            .collect::<Result<Vec<_>, _>>()
            .context("parsing client entries")?;
        Ok(ClientDirectory::with_entries(entries))
    }

    pub fn initial_client(&self, directory: &ClientDirectory) -> anyhow::Result<Client> {
        match &self.client {
            Some(name) => Ok(directory.find(name)?.clone()),
            None => Ok(directory.default_client().clone()),
        }
    }

    pub fn order_client(&self) -> OrderClient {
        OrderClient::new(self.order_endpoint.clone(), self.tenant.clone())
    }

    pub fn confirmation_sink(&self) -> anyhow::Result<Box<dyn ConfirmationSink>> {
        match (&self.log_url, &self.log_key) {
            (Some(url), Some(key)) => Ok(Box::new(ConfirmationLog::new(
                url.clone(),
                self.log_table.clone(),
                key.clone(),
            ))),
            (Some(_), None) => bail!("--log-url requires --log-key (or LOTCHECK_LOG_KEY)"),
            (None, _) => {
                tracing::warn!("no confirmation log configured; confirmations stay local");
                Ok(Box::new(DiscardLog))
            }
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            logo: self.logo.clone(),
        }
    }
}
