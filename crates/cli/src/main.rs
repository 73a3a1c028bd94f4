use anyhow::{bail, Context, Result};
use azmapper_core::ResourceHandle;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use secrecy::SecretString;
use serde_json::{Map as JsonMap, Value as Json};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

mod kinds;
mod stack;
mod state;

use kinds::{Clients, Kind};
use stack::{Declaration, Stack};
use state::StateStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "azmapper - Azure Monitor alert rules and HDInsight Storm clusters from YAML")]
struct Cli {
    /// Stack file (YAML)
    #[arg(short, long, default_value = "azmapper.yaml", global = true)]
    file: PathBuf,

    /// Output directory for state and rendered requests
    #[arg(short, long, default_value = "out", global = true)]
    out: PathBuf,

    /// ARM bearer token
    #[arg(long, env = "ARM_ACCESS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the attribute table of one or every supported type
    Schema {
        #[arg(long = "type")]
        type_name: Option<String>,
    },
    Validate,
    /// Print the request bodies a create would send
    Expand,
    Apply,
    Refresh,
    Destroy,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match &cli.cmd {
        Cmd::Schema { type_name } => schema(type_name.as_deref()),
        Cmd::Validate => validate(&Stack::load(&cli.file)?),
        Cmd::Expand => expand(&Stack::load(&cli.file)?, &cli.out).await,
        Cmd::Apply => apply(&cli).await,
        Cmd::Refresh => refresh(&cli).await,
        Cmd::Destroy => destroy(&cli).await,
    }
}

fn schema(type_name: Option<&str>) -> Result<()> {
    let selected = match type_name {
        Some(t) => vec![Kind::from_type(t)?],
        None => kinds::ALL.to_vec(),
    };
    for kind in selected {
        print!("{}", kinds::render_schema(kind.schema()));
        if let Some(data) = kinds::data_schema(kind) {
            print!("data {}", kinds::render_schema(data));
        }
    }
    Ok(())
}

fn validate(stack: &Stack) -> Result<()> {
    let mut failures = 0;
    for decl in &stack.resources {
        match Kind::from_type(&decl.type_name).and_then(|k| k.expand(&decl.document())) {
            Ok(_) => info!(resource = %decl.key(), "valid"),
            Err(e) => {
                error!(resource = %decl.key(), error = %e, "invalid");
                failures += 1;
            }
        }
    }
    for decl in &stack.data {
        let checked = Kind::from_type(&decl.type_name).and_then(|k| {
            let schema = kinds::data_schema(k).with_context(|| format!("'{}' has no data source", decl.type_name))?;
            schema.validate(&decl.document())?;
            Ok(())
        });
        if let Err(e) = checked {
            error!(data = %decl.key(), error = %e, "invalid");
            failures += 1;
        }
    }
    if failures > 0 {
        bail!("{} declaration(s) failed validation", failures);
    }
    println!("{} resource(s) and {} data source(s) are valid", stack.resources.len(), stack.data.len());
    Ok(())
}

async fn expand(stack: &Stack, out: &Path) -> Result<()> {
    let mut bodies = JsonMap::new();
    for decl in &stack.resources {
        let body = Kind::from_type(&decl.type_name)
            .and_then(|k| k.expand(&decl.document()))
            .with_context(|| format!("expanding {}", decl.key()))?;
        bodies.insert(decl.key(), body);
    }
    let rendered = serde_json::to_string_pretty(&Json::Object(bodies))?;
    tokio::fs::create_dir_all(out).await.with_context(|| format!("creating {}", out.display()))?;
    let path = out.join("requests.json");
    tokio::fs::write(&path, &rendered).await.with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote request bodies");
    println!("{}", rendered);
    Ok(())
}

/// Builds the shared clients. Ctrl-C flips the shutdown signal so pending
/// long-running operations stop polling.
fn connect(cli: &Cli, stack: &Stack) -> Result<Clients> {
    let provider = stack.azurerm()?;
    let token = cli.token.clone().context("no access token: set ARM_ACCESS_TOKEN or pass --token")?;
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling pending operations");
            let _ = tx.send(true);
        }
    });
    let arm = provider.client(SecretString::new(token), rx).context("building the ARM client")?;
    Ok(Clients::new(arm))
}

fn print_outputs(outputs: JsonMap<String, Json>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Json::Object(outputs))?);
    Ok(())
}

async fn apply(cli: &Cli) -> Result<()> {
    let stack = Stack::load(&cli.file)?;
    let kinds = stack
        .resources
        .iter()
        .map(|d| Kind::from_type(&d.type_name).with_context(|| d.key()))
        .collect::<Result<Vec<_>>>()?;
    let clients = connect(cli, &stack)?;
    let require_import = stack.azurerm()?.features.resources_must_be_imported;
    let store = StateStore::new(&cli.out);
    let mut state = store.load().await?;

    let mut outputs = JsonMap::new();
    let lookups = join_all(stack.data.iter().map(|d| kinds::read_data(&clients, d))).await;
    for (decl, result) in stack.data.iter().zip(lookups) {
        outputs.insert(format!("data.{}", decl.key()), result.with_context(|| format!("reading data.{}", decl.key()))?);
    }

    let runs = stack.resources.iter().zip(&kinds).map(|(decl, kind)| {
        let handle = state.resources.get(&decl.key()).cloned();
        let clients = &clients;
        async move { kind.apply(clients, &decl.document(), handle, require_import).await }
    });
    let results = join_all(runs).await;

    let mut failures = 0;
    for (decl, result) in stack.resources.iter().zip(results) {
        match result {
            Ok((handle, output)) => {
                state.resources.insert(decl.key(), handle);
                outputs.insert(decl.key(), output);
            }
            Err(e) => {
                error!(resource = %decl.key(), error = %format!("{:#}", e), "apply failed");
                failures += 1;
            }
        }
    }
    store.save(&state).await?;
    print_outputs(outputs)?;
    if failures > 0 {
        bail!("{} resource(s) failed to apply", failures);
    }
    Ok(())
}

async fn refresh(cli: &Cli) -> Result<()> {
    let stack = Stack::load(&cli.file)?;
    let clients = connect(cli, &stack)?;
    let store = StateStore::new(&cli.out);
    let mut state = store.load().await?;

    let tracked: Vec<(&Declaration, Kind, ResourceHandle)> = stack
        .resources
        .iter()
        .filter_map(|d| state.resources.get(&d.key()).map(|h| (d, h.clone())))
        .map(|(d, h)| -> Result<_> { Ok((d, Kind::from_type(&d.type_name)?, h)) })
        .collect::<Result<_>>()?;
    let results = join_all(tracked.iter().map(|(decl, kind, handle)| {
        let clients = &clients;
        async move { kind.refresh(clients, &decl.document(), handle.clone()).await }
    }))
    .await;

    let mut outputs = JsonMap::new();
    for ((decl, _, _), result) in tracked.iter().zip(results) {
        match result.with_context(|| format!("refreshing {}", decl.key()))? {
            Some(output) => {
                outputs.insert(decl.key(), output);
            }
            None => {
                state.resources.remove(&decl.key());
            }
        }
    }
    store.save(&state).await?;
    print_outputs(outputs)
}

/// Deletes everything the state file tracks, whether or not it is still declared.
async fn destroy(cli: &Cli) -> Result<()> {
    let stack = Stack::load(&cli.file)?;
    let clients = connect(cli, &stack)?;
    let store = StateStore::new(&cli.out);
    let mut state = store.load().await?;

    let tracked = state
        .resources
        .iter()
        .map(|(key, handle)| -> Result<_> {
            let type_name = key.split_once('.').map(|(t, _)| t).unwrap_or(key.as_str());
            Ok((key.clone(), Kind::from_type(type_name)?, handle.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    let results = join_all(tracked.iter().map(|(_, kind, handle)| kind.destroy(&clients, handle.clone()))).await;

    let mut failures = 0;
    for ((key, _, _), result) in tracked.iter().zip(results) {
        match result {
            Ok(()) => {
                state.resources.remove(key);
            }
            Err(e) => {
                error!(resource = %key, error = %format!("{:#}", e), "destroy failed");
                failures += 1;
            }
        }
    }
    store.save(&state).await?;
    if failures > 0 {
        bail!("{} resource(s) failed to delete", failures);
    }
    Ok(())
}
