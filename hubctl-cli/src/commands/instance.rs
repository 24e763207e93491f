//! Stack instance command handlers
//!
//! Every handler works against one `InstanceCache` per invocation, so a
//! selector is looked up at most once per run.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use hubctl_client::{HubClient, InstanceCache, InstancePatch, LifecycleVerb, PatchMode};
use hubctl_core::domain::instance::StackInstance;
use hubctl_core::dto::instance::StackInstancePatch;
use std::fs;
use std::io::{self, Read, Write};
use tracing::info;

use crate::config::Config;
use crate::follow::{LogFollower, PollingFollower};
use crate::format::{self, FormatOptions, Formatter};
use crate::kubeconfig;

/// Instance subcommands
#[derive(Subcommand)]
pub enum InstanceCommands {
    /// Show Stack Instances
    Get {
        /// Id or domain; omit to list every instance
        selector: Option<String>,

        /// Retrieve and show secret values
        #[arg(short, long)]
        secrets: bool,

        /// Show inflight operation logs
        #[arg(short, long)]
        logs: bool,

        /// Print JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Create a Stack Instance from a JSON request
    Create {
        /// Request file, `-` for stdin
        file: String,
    },
    /// Patch a Stack Instance
    Patch {
        /// Id or domain
        selector: String,

        /// Patch file, `-` for stdin
        file: String,

        /// Replace collections instead of merging them
        #[arg(long)]
        replace: bool,

        /// Submit the document as-is instead of the recognized patch fields
        #[arg(long)]
        raw: bool,
    },
    /// Deploy a Stack Instance
    Deploy {
        /// Id or domain
        selector: String,

        /// Follow the deployment log until it finishes
        #[arg(short, long)]
        wait: bool,

        /// Ask the hub to plan without applying
        #[arg(long)]
        dry_run: bool,
    },
    /// Undeploy a Stack Instance
    Undeploy {
        /// Id or domain
        selector: String,

        /// Follow the undeployment log until it finishes
        #[arg(short, long)]
        wait: bool,

        /// Ask the hub to plan without applying
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete a Stack Instance
    Delete {
        /// Id or domain
        selector: String,
    },
    /// Save the Kubernetes config of a Stack Instance
    Kubeconfig {
        /// Id or domain
        selector: String,

        /// Output file or directory, `-` for stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// List state file locations of a Stack Instance
    StateFiles {
        /// Id or domain
        selector: String,
    },
}

/// Handle instance commands
///
/// Returns the process exit status: zero, or the status of a followed
/// deployment.
pub async fn handle_instance_command(command: InstanceCommands, config: &Config) -> Result<i32> {
    let client = config.client()?;
    let follower = PollingFollower::new(client.clone(), config.poll_interval);
    let mut cache = InstanceCache::new();

    match command {
        InstanceCommands::Get {
            selector,
            secrets,
            logs,
            json,
        } => {
            let options = FormatOptions {
                show_secrets: secrets,
                show_logs: logs,
            };
            let selector = selector.as_deref().unwrap_or_default();
            get_instances(&client, selector, options, json, &mut io::stdout()).await?;
        }
        InstanceCommands::Create { file } => create_instance(&client, &file).await?,
        InstanceCommands::Patch {
            selector,
            file,
            replace,
            raw,
        } => {
            let mode = if replace {
                PatchMode::Replace
            } else {
                PatchMode::Merge
            };
            patch_instance(&client, &mut cache, &selector, &file, mode, raw).await?;
        }
        InstanceCommands::Deploy {
            selector,
            wait,
            dry_run,
        } => {
            return command_instance(
                &client,
                &mut cache,
                &follower,
                &selector,
                LifecycleVerb::Deploy,
                wait,
                dry_run,
            )
            .await;
        }
        InstanceCommands::Undeploy {
            selector,
            wait,
            dry_run,
        } => {
            return command_instance(
                &client,
                &mut cache,
                &follower,
                &selector,
                LifecycleVerb::Undeploy,
                wait,
                dry_run,
            )
            .await;
        }
        InstanceCommands::Delete { selector } => {
            delete_instance(&client, &mut cache, &selector).await?
        }
        InstanceCommands::Kubeconfig {
            selector,
            output,
            force,
        } => save_kubeconfig(&client, &mut cache, &selector, output.as_deref(), force).await?,
        InstanceCommands::StateFiles { selector } => {
            state_files(&client, &mut cache, &selector).await?
        }
    }

    Ok(0)
}

/// Print every instance matching the selector
///
/// An empty result is reported on stderr, so `--json` output stays empty.
async fn get_instances<W: Write>(
    client: &HubClient,
    selector: &str,
    options: FormatOptions,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let instances = client.instances_by(selector).await?;

    if json {
        if instances.is_empty() {
            eprintln!("{}", "No Stack Instances".yellow());
            return Ok(());
        }
        let text = if instances.len() == 1 {
            serde_json::to_string_pretty(&instances[0])?
        } else {
            serde_json::to_string_pretty(&instances)?
        };
        writeln!(out, "{}", text)?;
        return Ok(());
    }

    let mut formatter = Formatter::new(client, options);
    let mut nodes = Vec::with_capacity(instances.len());
    for instance in &instances {
        nodes.push(formatter.instance(instance).await);
    }
    let errors = formatter.into_errors();

    format::write_document(out, &nodes, &errors)?;
    Ok(())
}

/// Create an instance from a request document
async fn create_instance(client: &HubClient, file: &str) -> Result<()> {
    let body = read_input(file)?;

    let instance = client
        .create_instance_raw(body)
        .await
        .context("Failed to create Stack Instance")?;

    println!(
        "{} Created Stack Instance {}",
        "✓".green().bold(),
        instance.id.bold()
    );
    print_instance(client, &instance).await
}

/// Apply a patch document to an instance
async fn patch_instance(
    client: &HubClient,
    cache: &mut InstanceCache,
    selector: &str,
    file: &str,
    mode: PatchMode,
    raw: bool,
) -> Result<()> {
    let body = read_input(file)?;
    let patch = if raw {
        InstancePatch::raw(&body, mode)?
    } else {
        let change: StackInstancePatch =
            serde_json::from_slice(&body).with_context(|| format!("Unable to parse `{}`", file))?;
        InstancePatch::typed(change, mode)
    };

    let instance = client.patch_instance(cache, selector, &patch).await?;

    println!(
        "{} Patched Stack Instance {}",
        "✓".green().bold(),
        instance.id.bold()
    );
    print_instance(client, &instance).await
}

/// Deploy or undeploy, optionally following the operation log
async fn command_instance(
    client: &HubClient,
    cache: &mut InstanceCache,
    follower: &dyn LogFollower,
    selector: &str,
    verb: LifecycleVerb,
    wait: bool,
    dry_run: bool,
) -> Result<i32> {
    let outcome = match verb {
        LifecycleVerb::Deploy => client.deploy_instance(cache, selector, dry_run).await?,
        LifecycleVerb::Undeploy => client.undeploy_instance(cache, selector, dry_run).await?,
    };

    println!(
        "{} Requested {} of {} [{}]",
        "✓".green().bold(),
        verb,
        outcome.domain.bold(),
        outcome.instance_id
    );
    if !outcome.job_id.is_empty() {
        println!("  Job: {}", outcome.job_id.dimmed());
    }

    if wait {
        return follower.follow(&outcome.domain).await;
    }
    Ok(0)
}

/// Delete an instance
async fn delete_instance(client: &HubClient, cache: &mut InstanceCache, selector: &str) -> Result<()> {
    let outcome = client.delete_instance(cache, selector).await?;

    if let Some(warning) = &outcome.warning {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
    println!(
        "{} Deleted Stack Instance {}",
        "✓".green().bold(),
        outcome.instance_id.bold()
    );
    Ok(())
}

/// Fetch and save the kubeconfig of an instance
async fn save_kubeconfig(
    client: &HubClient,
    cache: &mut InstanceCache,
    selector: &str,
    output: Option<&str>,
    force: bool,
) -> Result<()> {
    let config = client.fetch_kubeconfig(cache, selector).await?;

    let target = kubeconfig::resolve_target(output, &config.domain, force)?;
    kubeconfig::write_kubeconfig(&target, &config.data)?;
    if let kubeconfig::Target::File(path) = &target {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Print state file locations grouped by storage kind
async fn state_files(client: &HubClient, cache: &mut InstanceCache, selector: &str) -> Result<()> {
    let instance = client.resolve(cache, selector).await?;
    let targets = instance.state_file_targets();

    if targets.is_empty() {
        println!("{}", "No state files.".yellow());
        return Ok(());
    }
    for files in targets {
        println!("{}:", files.kind.to_string().bold());
        for path in &files.paths {
            println!("\t{}", path);
        }
    }
    Ok(())
}

/// Print an instance returned by a write call, secrets masked
async fn print_instance(client: &HubClient, instance: &StackInstance) -> Result<()> {
    let mut formatter = Formatter::new(client, FormatOptions::default());
    let node = formatter.instance(instance).await;
    let errors = formatter.into_errors();

    let mut stdout = io::stdout().lock();
    format::write_node(&mut stdout, &node, 0)?;
    format::write_errors(&mut stdout, "Errors encountered formatting response:", &errors)?;
    Ok(())
}

/// Read a document from a file, or stdin for `-`
fn read_input(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Unable to read stdin")?;
        return Ok(buf);
    }
    fs::read(source).with_context(|| format!("Unable to read `{}`", source))
}
