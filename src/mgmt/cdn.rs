use std::sync::Arc;

use async_trait::async_trait;
use azure_core::http::Method;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::CdnManagement;
use crate::client::Client;
use crate::error::Result;
use crate::models::{
    Endpoint, EndpointCreateParameters, Page, Profile, ProfileCreateParameters, PurgeParameters,
};

const API_VERSION: &str = "2024-02-01";

/// Profile and endpoint operations of the `Microsoft.Cdn` resource provider.
#[derive(Debug, Clone)]
pub struct CdnManagementClient {
    client: Arc<Client>,
    subscription_id: String,
}

impl CdnManagementClient {
    pub fn new(client: Arc<Client>, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }

    fn profile_path(&self, resource_group: &str, profile: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Cdn/profiles/{}",
            self.subscription_id, resource_group, profile
        )
    }

    fn endpoint_path(&self, resource_group: &str, profile: &str, endpoint: &str) -> String {
        format!(
            "{}/endpoints/{}",
            self.profile_path(resource_group, profile),
            endpoint
        )
    }

    async fn list_all<T: DeserializeOwned>(&self, api_path: &str) -> Result<Vec<T>> {
        let resp = self
            .client
            .run(Method::Get, api_path, API_VERSION, None)
            .await?;
        let mut page: Page<T> = resp.json()?;
        let mut items = std::mem::take(&mut page.value);
        while let Some(next_link) = page.next_link.take() {
            debug!(%next_link, "following next link");
            page = self.client.get_url(&next_link).await?.json()?;
            items.append(&mut page.value);
        }
        Ok(items)
    }

    async fn delete_if_exists(&self, api_path: &str) -> Result<()> {
        // ARM answers a DELETE of a missing resource with 204, some RPs with 404.
        match self
            .client
            .run(Method::Delete, api_path, API_VERSION, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(api_path, code = err.error_code(), "nothing to delete");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl CdnManagement for CdnManagementClient {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Cdn/profiles",
            self.subscription_id
        );
        self.list_all(&path).await
    }

    async fn list_endpoints(&self, profile: &str, resource_group: &str) -> Result<Vec<Endpoint>> {
        let path = format!("{}/endpoints", self.profile_path(resource_group, profile));
        self.list_all(&path).await
    }

    async fn create_profile(
        &self,
        name: &str,
        params: &ProfileCreateParameters,
        resource_group: &str,
    ) -> Result<Profile> {
        let body = Bytes::from(serde_json::to_vec(params)?);
        self.client
            .run(
                Method::Put,
                &self.profile_path(resource_group, name),
                API_VERSION,
                Some(body),
            )
            .await?
            .json()
    }

    async fn create_endpoint(
        &self,
        name: &str,
        params: &EndpointCreateParameters,
        profile: &str,
        resource_group: &str,
    ) -> Result<Endpoint> {
        let body = Bytes::from(serde_json::to_vec(params)?);
        self.client
            .run(
                Method::Put,
                &self.endpoint_path(resource_group, profile, name),
                API_VERSION,
                Some(body),
            )
            .await?
            .json()
    }

    async fn purge_content(
        &self,
        endpoint: &str,
        profile: &str,
        resource_group: &str,
        content_paths: &[String],
    ) -> Result<()> {
        let params = PurgeParameters {
            content_paths: content_paths.to_vec(),
        };
        let body = Bytes::from(serde_json::to_vec(&params)?);
        let path = format!(
            "{}/purge",
            self.endpoint_path(resource_group, profile, endpoint)
        );
        self.client
            .run(Method::Post, &path, API_VERSION, Some(body))
            .await?;
        Ok(())
    }

    async fn delete_profile_if_exists(&self, name: &str, resource_group: &str) -> Result<()> {
        self.delete_if_exists(&self.profile_path(resource_group, name))
            .await
    }

    async fn delete_endpoint_if_exists(
        &self,
        name: &str,
        profile: &str,
        resource_group: &str,
    ) -> Result<()> {
        self.delete_if_exists(&self.endpoint_path(resource_group, profile, name))
            .await
    }
}
