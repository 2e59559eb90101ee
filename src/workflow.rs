//! The provision / inspect / tear-down sequence, one step per method.

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::mgmt::{CdnManagement, ResourceGroups};
use crate::models::{
    DeepCreatedOrigin, EndpointCreateParameters, ProfileCreateParameters, ResourceGroup, Sku,
    SkuName,
};
use crate::prompt::{prompt_user, KeySource};

/// The names and settings of everything the console creates.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub resource_group: String,
    pub location: String,
    pub profile: String,
    pub endpoint: String,
    pub origin_name: String,
    pub origin_host: String,
    pub sku: SkuName,
    pub purge_paths: Vec<String>,
}

/// Whether the planned profile and endpoint showed up in the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub profile_exists: bool,
    pub endpoint_exists: bool,
}

pub struct Workflow<'a, R: ?Sized, C: ?Sized, W> {
    resources: &'a R,
    cdn: &'a C,
    plan: &'a Plan,
    out: W,
}

impl<'a, R, C, W> Workflow<'a, R, C, W>
where
    R: ResourceGroups + ?Sized,
    C: CdnManagement + ?Sized,
    W: Write,
{
    pub fn new(resources: &'a R, cdn: &'a C, plan: &'a Plan, out: W) -> Self {
        Self {
            resources,
            cdn,
            plan,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Creates the resource group unless it already exists. Returns whether it was created.
    pub async fn ensure_resource_group(&mut self) -> Result<bool> {
        let name = &self.plan.resource_group;
        if self.resources.check_existence(name).await? {
            writeln!(self.out, "Resource group {name} already exists.")?;
            return Ok(false);
        }
        writeln!(self.out, "Creating resource group {name}.")?;
        self.resources
            .create_or_update(name, &ResourceGroup::new(self.plan.location.clone()))
            .await?;
        info!(resource_group = %name, "created resource group");
        Ok(true)
    }

    /// Lists every profile and its endpoints, printing them as it goes.
    pub async fn list_inventory(&mut self) -> Result<Inventory> {
        let mut inventory = Inventory::default();
        for profile in self.cdn.list_profiles().await? {
            let resource_group = profile.resource_group()?;
            writeln!(
                self.out,
                "CDN profile {} in Resource Group {}",
                profile.name, resource_group
            )?;
            if profile.name == self.plan.profile {
                inventory.profile_exists = true;
            }

            writeln!(self.out, "Endpoints:")?;
            let endpoints = self
                .cdn
                .list_endpoints(&profile.name, &resource_group)
                .await?;
            for endpoint in &endpoints {
                writeln!(self.out, "-{} ({})", endpoint.name, endpoint.host_name())?;
                // endpoint host names are global, so a match in any profile counts
                if endpoint.name == self.plan.endpoint {
                    inventory.endpoint_exists = true;
                }
            }
            writeln!(self.out)?;
        }
        Ok(inventory)
    }

    pub async fn ensure_profile(&mut self, exists: bool) -> Result<bool> {
        let plan = self.plan;
        if exists {
            writeln!(self.out, "Profile {} already exists.", plan.profile)?;
            return Ok(false);
        }
        writeln!(self.out, "Creating profile {}.", plan.profile)?;
        let params = ProfileCreateParameters {
            location: plan.location.clone(),
            sku: Sku { name: plan.sku },
        };
        self.cdn
            .create_profile(&plan.profile, &params, &plan.resource_group)
            .await?;
        info!(profile = %plan.profile, sku = %plan.sku, "created CDN profile");
        Ok(true)
    }

    pub async fn ensure_endpoint(&mut self, exists: bool) -> Result<bool> {
        let plan = self.plan;
        if exists {
            writeln!(self.out, "Endpoint {} already exists.", plan.endpoint)?;
            return Ok(false);
        }
        writeln!(
            self.out,
            "Creating endpoint {} on profile {}.",
            plan.endpoint, plan.profile
        )?;
        let params = EndpointCreateParameters::new(
            plan.location.clone(),
            vec![DeepCreatedOrigin::new(
                plan.origin_name.clone(),
                plan.origin_host.clone(),
            )],
        );
        self.cdn
            .create_endpoint(&plan.endpoint, &params, &plan.profile, &plan.resource_group)
            .await?;
        info!(endpoint = %plan.endpoint, "created CDN endpoint");
        Ok(true)
    }

    fn confirm<K: KeySource + ?Sized>(&mut self, keys: &mut K, question: &str) -> Result<bool> {
        prompt_user(keys, &mut self.out, question)
    }

    fn done(&mut self) -> Result<()> {
        writeln!(self.out, "Done.")?;
        writeln!(self.out)?;
        Ok(())
    }

    pub async fn prompt_purge<K: KeySource + ?Sized>(&mut self, keys: &mut K) -> Result<bool> {
        let plan = self.plan;
        if !self.confirm(keys, &format!("Purge CDN endpoint {}?", plan.endpoint))? {
            return Ok(false);
        }
        writeln!(self.out, "Purging endpoint. Please wait...")?;
        self.cdn
            .purge_content(
                &plan.endpoint,
                &plan.profile,
                &plan.resource_group,
                &plan.purge_paths,
            )
            .await?;
        self.done()?;
        Ok(true)
    }

    pub async fn prompt_delete_endpoint<K: KeySource + ?Sized>(
        &mut self,
        keys: &mut K,
    ) -> Result<bool> {
        let plan = self.plan;
        let question = format!(
            "Delete CDN endpoint {} on profile {}?",
            plan.endpoint, plan.profile
        );
        if !self.confirm(keys, &question)? {
            return Ok(false);
        }
        writeln!(self.out, "Deleting endpoint. Please wait...")?;
        self.cdn
            .delete_endpoint_if_exists(&plan.endpoint, &plan.profile, &plan.resource_group)
            .await?;
        self.done()?;
        Ok(true)
    }

    pub async fn prompt_delete_profile<K: KeySource + ?Sized>(
        &mut self,
        keys: &mut K,
    ) -> Result<bool> {
        let plan = self.plan;
        if !self.confirm(keys, &format!("Delete CDN profile {}?", plan.profile))? {
            return Ok(false);
        }
        writeln!(self.out, "Deleting profile. Please wait...")?;
        self.cdn
            .delete_profile_if_exists(&plan.profile, &plan.resource_group)
            .await?;
        self.done()?;
        Ok(true)
    }

    pub async fn prompt_delete_resource_group<K: KeySource + ?Sized>(
        &mut self,
        keys: &mut K,
    ) -> Result<bool> {
        let plan = self.plan;
        let question = format!("Delete Resource Group {}?", plan.resource_group);
        if !self.confirm(keys, &question)? {
            return Ok(false);
        }
        writeln!(self.out, "Deleting Resource Group. Please wait...")?;
        self.resources.delete(&plan.resource_group).await?;
        self.done()?;
        Ok(true)
    }

    /// Runs every step in order.
    pub async fn run<K: KeySource + ?Sized>(&mut self, keys: &mut K) -> Result<()> {
        self.ensure_resource_group().await?;

        let inventory = self.list_inventory().await?;
        self.ensure_profile(inventory.profile_exists).await?;
        self.ensure_endpoint(inventory.endpoint_exists).await?;
        writeln!(self.out)?;

        self.prompt_purge(keys).await?;
        self.prompt_delete_endpoint(keys).await?;
        self.prompt_delete_profile(keys).await?;
        self.prompt_delete_resource_group(keys).await?;
        Ok(())
    }
}
