//! Command line interface of `ctk`.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use snafu::prelude::*;
use tracing::info;

use cratedb_toolkit_core::config::ConfigArgs;
use cratedb_toolkit_core::model::{InputOutputResource, TableAddress};
use cratedb_toolkit_core::sql::Credentials;

use crate::cluster::{Cluster, ClusterSelector, LoadOutcome};
use crate::config::ToolkitConfig;
use crate::error::{AppError, ClusterError, InvalidNameSnafu, RenderSnafu};
use crate::materialized::{
    MaterializedView, MaterializedViewManager, MaterializedViewSettings, MaterializedViewStore,
};
use crate::toolkit::Toolkit;

/// CrateDB Toolkit: cluster acquisition and data loading.
#[derive(Parser, Debug)]
#[command(name = "ctk", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    /// Include HTTP client internals in the log
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load data into CrateDB
    #[command(subcommand)]
    Load(LoadCommand),

    /// Inspect and acquire clusters
    #[command(subcommand)]
    Cluster(ClusterCommand),

    /// Inspect import jobs of a managed cluster
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Manage materialized views
    #[command(subcommand)]
    Materialized(MaterializedCommand),
}

#[derive(Subcommand, Debug)]
pub enum LoadCommand {
    /// Load a resource into a table
    Table(LoadTableArgs),
}

#[derive(Args, Debug)]
pub struct LoadTableArgs {
    /// Source URL, e.g. https://.../data.csv.gz, influxdb2://..., mongodb://...
    pub url: String,

    #[command(flatten)]
    pub selector: ClusterSelector,

    /// Target schema
    #[arg(long, env = "CRATEDB_SCHEMA")]
    pub schema: Option<String>,

    /// Target table
    #[arg(long, env = "CRATEDB_TABLE")]
    pub table: Option<String>,

    /// Source format: csv, json, parquet
    #[arg(long)]
    pub format: Option<String>,

    /// Source compression: gzip
    #[arg(long)]
    pub compression: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Print information about a cluster as JSON
    Info {
        #[command(flatten)]
        selector: ClusterSelector,
    },
    /// Start a managed cluster, deploying it when absent
    Start {
        #[command(flatten)]
        selector: ClusterSelector,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobsCommand {
    /// List import jobs as JSON
    List {
        #[command(flatten)]
        selector: ClusterSelector,
    },
}

#[derive(Subcommand, Debug)]
pub enum MaterializedCommand {
    /// Create the management table
    Setup {
        #[command(flatten)]
        selector: ClusterSelector,
    },
    /// Register a materialized view
    Create {
        /// Target table, as <schema>.<table>
        name: String,
        /// SELECT statement defining the view
        sql: String,
        #[command(flatten)]
        selector: ClusterSelector,
    },
    /// Rebuild a materialized view
    Refresh {
        /// Target table, as <schema>.<table>
        name: String,
        /// Log statements instead of running them
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        selector: ClusterSelector,
    },
}

/// Run a parsed command line against the given configuration.
pub async fn run(command: Command, config: ToolkitConfig) -> Result<(), AppError> {
    let toolkit = Toolkit::new(config);
    match command {
        Command::Load(LoadCommand::Table(args)) => load_table(&toolkit, args).await,
        Command::Cluster(ClusterCommand::Info { selector }) => {
            cluster_info(&toolkit, &selector).await
        }
        Command::Cluster(ClusterCommand::Start { selector }) => {
            let mut cluster = toolkit.cluster(&selector)?;
            let cluster = cluster.as_managed()?;
            cluster.start().await?;
            print_json(&cluster.info().map(|info| &info.raw))
        }
        Command::Jobs(JobsCommand::List { selector }) => {
            let mut cluster = toolkit.cluster(&selector)?;
            let jobs = cluster.as_managed()?.jobs().await?.list().await?;
            print_json(&jobs)
        }
        Command::Materialized(command) => materialized(&toolkit, command).await,
    }
}

async fn load_table(toolkit: &Toolkit, args: LoadTableArgs) -> Result<(), AppError> {
    let mut cluster = toolkit.cluster(&args.selector)?;
    let source = InputOutputResource::new(args.url)
        .with_format(args.format)
        .with_compression(args.compression);
    let target = TableAddress {
        schema: args.schema,
        table: args.table,
    };
    match cluster.load_table(&source, &target).await? {
        LoadOutcome::Job(job) => info!(status = job.status(), "Import job finished"),
        LoadOutcome::Copied => info!("Copy finished"),
    }
    Ok(())
}

async fn cluster_info(toolkit: &Toolkit, selector: &ClusterSelector) -> Result<(), AppError> {
    let mut cluster = toolkit.cluster(selector)?;
    let document = match &mut cluster {
        Cluster::Managed(managed) => {
            managed.probe().await?;
            match managed.info() {
                Some(info) => info.raw.clone(),
                None => json!({
                    "id": managed.id(),
                    "name": managed.name(),
                    "exists": false,
                }),
            }
        }
        Cluster::Standalone(standalone) => {
            let url = standalone.address().safe();
            let bundle = standalone.client_bundle(Credentials::default())?;
            let records = bundle
                .adapter
                .run_sql_records("SELECT id, name FROM sys.cluster")
                .await
                .map_err(|source| ClusterError::Connect { source })?;
            json!({ "url": url, "cluster": records.into_iter().next().map(Value::Object) })
        }
    };
    print_json(&document)
}

async fn materialized(toolkit: &Toolkit, command: MaterializedCommand) -> Result<(), AppError> {
    let (selector, dry_run) = match &command {
        MaterializedCommand::Setup { selector } | MaterializedCommand::Create { selector, .. } => {
            (selector, false)
        }
        MaterializedCommand::Refresh {
            selector, dry_run, ..
        } => (selector, *dry_run),
    };
    let mut cluster = toolkit.cluster(selector)?;
    let bundle = cluster.client_bundle(Credentials::default()).await?;
    let settings = MaterializedViewSettings {
        materialized_table: toolkit.config().materialized.table_address(),
        dry_run,
    };
    let store = MaterializedViewStore::new(bundle.adapter.clone(), settings);

    match command {
        MaterializedCommand::Setup { .. } => store.setup().await?,
        MaterializedCommand::Create { name, sql, .. } => {
            let target =
                TableAddress::parse(&name).context(InvalidNameSnafu { name })?;
            store.create(&MaterializedView::new(&target, sql), None).await?;
        }
        MaterializedCommand::Refresh { name, .. } => {
            MaterializedViewManager::new(store).refresh(&name).await?;
        }
    }
    bundle.connection.close();
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).context(RenderSnafu)?;
    println!("{text}");
    Ok(())
}

