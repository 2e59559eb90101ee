use std::time::Duration;

use clap::{Args, Parser, ValueEnum};

use crate::models::SkuName;
use crate::workflow::Plan;

// Public client id of the Azure CLI; it is allowed to use the device code flow.
const AZURE_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Create, inspect, purge and tear down an Azure CDN profile and endpoint.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub resources: ResourceArgs,

    /// Seconds between polls of a long-running operation without Retry-After
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Exit right after the last prompt instead of waiting for Enter
    #[arg(long)]
    pub no_pause: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    /// Interactive sign-in with a device code (always prompts)
    DeviceCode,
    /// Reuse the Azure CLI's signed-in account
    AzureCli,
    /// Use the bearer token given with --access-token
    Token,
}

#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// How to obtain the management API token
    #[arg(long, value_enum, env = "CDN_CONSOLE_AUTH", default_value_t = AuthMode::DeviceCode)]
    pub auth: AuthMode,

    /// Directory (tenant) to sign in to; needed for device code sign-in
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Application (client) id used for the device code sign-in
    #[arg(long, env = "AZURE_CLIENT_ID", default_value = AZURE_CLI_CLIENT_ID)]
    pub client_id: String,

    #[arg(
        long,
        env = "AZURE_AUTHORITY_HOST",
        default_value = "https://login.microsoftonline.com"
    )]
    pub authority_host: String,

    /// Pre-issued bearer token for the management API
    #[arg(
        long,
        env = "AZURE_ACCESS_TOKEN",
        hide_env_values = true,
        required_if_eq("auth", "token")
    )]
    pub access_token: Option<String>,

    /// Subscription that holds the resources
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: String,

    #[arg(
        long,
        env = "AZURE_MANAGEMENT_ENDPOINT",
        default_value = "https://management.azure.com"
    )]
    pub management_endpoint: String,
}

#[derive(Args, Debug, Clone)]
pub struct ResourceArgs {
    #[arg(long, env = "CDN_CONSOLE_RESOURCE_GROUP", default_value = "CdnConsoleRG")]
    pub resource_group: String,

    /// Region for the resource group, profile and endpoint
    #[arg(long, env = "CDN_CONSOLE_LOCATION", default_value = "Central US")]
    pub location: String,

    #[arg(long, env = "CDN_CONSOLE_PROFILE", default_value = "CdnConsoleApp")]
    pub profile: String,

    /// Endpoint name; it becomes the <name>.azureedge.net host name
    #[arg(long, env = "CDN_CONSOLE_ENDPOINT", default_value = "CdnConsoleEndpoint")]
    pub endpoint: String,

    #[arg(long, env = "CDN_CONSOLE_ORIGIN_NAME", default_value = "contoso-origin")]
    pub origin_name: String,

    #[arg(long, env = "CDN_CONSOLE_ORIGIN_HOST", default_value = "www.contoso.com")]
    pub origin_host: String,

    #[arg(long, value_enum, env = "CDN_CONSOLE_SKU", default_value_t = SkuName::StandardMicrosoft)]
    pub sku: SkuName,

    /// Content path to purge; may be repeated
    #[arg(long = "purge-path", default_value = "/*")]
    pub purge_paths: Vec<String>,
}

impl Cli {
    pub fn plan(&self) -> Plan {
        let r = &self.resources;
        Plan {
            resource_group: r.resource_group.clone(),
            location: r.location.clone(),
            profile: r.profile.clone(),
            endpoint: r.endpoint.clone(),
            origin_name: r.origin_name.clone(),
            origin_host: r.origin_host.clone(),
            sku: r.sku,
            purge_paths: r.purge_paths.clone(),
        }
    }

    pub fn poll_frequency(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}
