//! Provision (or tear down) the conversion worker's infrastructure stack.
//!
//! Stages deployment artifacts in a resource bucket, renders the stack
//! template, and reconciles the named stack. On success the stack outputs
//! (credential pair, input/output bucket names) are printed and optionally
//! written out as a DOCRELAY_* env file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use docrelay_cli::{init_tracing, render_env_config};
use docrelay_provision::{CloudFormationStackEngine, Provisioner, ProvisionerConfig};
use docrelay_storage::S3ObjectStore;

#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(about = "Provision the document conversion environment")]
struct Args {
    /// API access key id. Falls back to the ambient credential chain.
    #[arg(long)]
    access_key: Option<String>,

    /// API secret access key
    #[arg(long)]
    secret_key: Option<String>,

    /// Region to deploy into
    #[arg(long, default_value = "ap-southeast-2")]
    region: String,

    /// Stack name, unique per deployment
    #[arg(long, default_value = "docrelay")]
    stack_name: String,

    /// Path to the stack template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Deployment artifact to stage in the resource bucket (repeatable)
    #[arg(long = "resource", value_name = "FILE")]
    resources: Vec<PathBuf>,

    /// Replace the stack if it already exists
    #[arg(long)]
    replace_stack: bool,

    /// Tear down the stack and its resource bucket instead of provisioning
    #[arg(long)]
    remove_stack: bool,

    /// Write the stack outputs as DOCRELAY_* settings to this file
    #[arg(long, value_name = "FILE")]
    set_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let credentials = match (args.access_key.clone(), args.secret_key.clone()) {
        (Some(key), Some(secret)) => Some((key, secret)),
        (None, None) => None,
        _ => bail!("--access-key and --secret-key must be given together"),
    };

    let engine =
        CloudFormationStackEngine::new(args.region.clone(), credentials.clone()).await;
    let store = S3ObjectStore::new(args.region.clone(), credentials).await;
    let provisioner = Provisioner::new(
        Arc::new(engine),
        Arc::new(store),
        ProvisionerConfig::new(&args.stack_name, &args.region),
    );

    if args.remove_stack {
        provisioner
            .remove_stack()
            .await
            .with_context(|| format!("Failed to remove stack {}", args.stack_name))?;
        println!("Stack {} and its resource bucket removed", args.stack_name);
        return Ok(());
    }

    let template_path = args
        .template
        .context("--template is required when provisioning")?;
    let template = tokio::fs::read_to_string(&template_path)
        .await
        .with_context(|| format!("Failed to read template {}", template_path.display()))?;

    let outcome = provisioner
        .provision_stack(&template, &args.resources, args.replace_stack)
        .await
        .with_context(|| format!("Failed to provision stack {}", args.stack_name))?;

    println!("{}", outcome.message);
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.outputs).context("Serialize stack outputs")?
    );

    if let Some(path) = args.set_config {
        tokio::fs::write(&path, render_env_config(&outcome.outputs, &args.region))
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Settings written to {}", path.display());
    }

    Ok(())
}
