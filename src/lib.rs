use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use azure_core::credentials::TokenCredential;
use azure_identity::AzureCliCredential;
use tracing::info;

use azidentityext::{AccessTokenCredential, DeviceCodeFlow};
use client::Client;
use cmd::{AuthArgs, AuthMode, Cli};
use mgmt::{CdnManagementClient, ResourceManagementClient};
use workflow::Workflow;

pub mod azidentityext;
pub mod client;
pub mod cmd;
pub mod error;
pub mod mgmt;
pub mod models;
pub mod prompt;
pub mod resource_id;
pub mod workflow;

pub use error::Error;

/// Obtains the credential for the management API according to `--auth`.
pub async fn authenticate<W: Write>(
    args: &AuthArgs,
    out: &mut W,
) -> Result<Arc<dyn TokenCredential>> {
    match args.auth {
        AuthMode::DeviceCode => {
            let tenant_id = args
                .tenant_id
                .as_deref()
                .ok_or_else(|| anyhow!("--tenant-id is required for device code sign-in"))?;
            let scope = format!(
                "{}/.default",
                args.management_endpoint.trim_end_matches('/')
            );
            let flow = DeviceCodeFlow::new(&args.authority_host, tenant_id, &args.client_id, &scope);
            let credential = flow.login(out).await?;
            info!(expires_on = %credential.expires_on(), "obtained management token");
            Ok(credential)
        }
        AuthMode::AzureCli => Ok(AzureCliCredential::new(None)?),
        AuthMode::Token => {
            let token = args
                .access_token
                .clone()
                .ok_or_else(|| anyhow!("--access-token is required with --auth token"))?;
            Ok(AccessTokenCredential::with_default_expiry(token))
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut stdout = std::io::stdout();
    let credential = authenticate(&cli.auth, &mut stdout)
        .await
        .context("signing in")?;

    let client = Arc::new(
        Client::new(&cli.auth.management_endpoint, credential, None)?
            .with_poll_frequency(cli.poll_frequency()),
    );
    let resources = ResourceManagementClient::new(client.clone(), &cli.auth.subscription_id);
    let cdn = CdnManagementClient::new(client, &cli.auth.subscription_id);

    let plan = cli.plan();
    let mut keys = prompt::stdin_keys();
    let mut workflow = Workflow::new(&resources, &cdn, &plan, stdout);
    workflow.run(&mut keys).await?;

    if !cli.no_pause {
        let mut stdout = workflow.into_output();
        writeln!(stdout, "Press Enter to end program.")?;
        stdout.flush()?;
        prompt::wait_for_enter(&mut keys)?;
    }
    Ok(())
}
