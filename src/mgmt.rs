//! The management operations the console needs, as traits so the workflow
//! can run against the live service or an in-memory double.

mod cdn;
mod resources;

pub use cdn::CdnManagementClient;
pub use resources::ResourceManagementClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Endpoint, EndpointCreateParameters, Profile, ProfileCreateParameters, ResourceGroup,
};

#[async_trait]
pub trait ResourceGroups: Send + Sync {
    async fn check_existence(&self, name: &str) -> Result<bool>;

    async fn create_or_update(&self, name: &str, group: &ResourceGroup) -> Result<ResourceGroup>;

    /// Deletes the group and everything in it. Fails if the group does not exist.
    async fn delete(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait CdnManagement: Send + Sync {
    /// Every CDN profile in the subscription.
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    async fn list_endpoints(&self, profile: &str, resource_group: &str) -> Result<Vec<Endpoint>>;

    async fn create_profile(
        &self,
        name: &str,
        params: &ProfileCreateParameters,
        resource_group: &str,
    ) -> Result<Profile>;

    async fn create_endpoint(
        &self,
        name: &str,
        params: &EndpointCreateParameters,
        profile: &str,
        resource_group: &str,
    ) -> Result<Endpoint>;

    async fn purge_content(
        &self,
        endpoint: &str,
        profile: &str,
        resource_group: &str,
        content_paths: &[String],
    ) -> Result<()>;

    /// Succeeds without doing anything when the profile is already gone.
    async fn delete_profile_if_exists(&self, name: &str, resource_group: &str) -> Result<()>;

    async fn delete_endpoint_if_exists(
        &self,
        name: &str,
        profile: &str,
        resource_group: &str,
    ) -> Result<()>;
}
