use std::sync::Arc;

use async_trait::async_trait;
use azure_core::http::Method;
use bytes::Bytes;
use tracing::debug;

use super::ResourceGroups;
use crate::client::Client;
use crate::error::Result;
use crate::models::ResourceGroup;

const API_VERSION: &str = "2021-04-01";

/// Resource-group operations of Azure Resource Manager.
#[derive(Debug, Clone)]
pub struct ResourceManagementClient {
    client: Arc<Client>,
    subscription_id: String,
}

impl ResourceManagementClient {
    pub fn new(client: Arc<Client>, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }

    fn group_path(&self, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourcegroups/{}",
            self.subscription_id, name
        )
    }
}

#[async_trait]
impl ResourceGroups for ResourceManagementClient {
    async fn check_existence(&self, name: &str) -> Result<bool> {
        match self
            .client
            .send(Method::Head, &self.group_path(name), API_VERSION, None)
            .await
        {
            Ok(resp) => {
                debug!(name, status = resp.status(), "resource group exists");
                Ok(true)
            }
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn create_or_update(&self, name: &str, group: &ResourceGroup) -> Result<ResourceGroup> {
        let body = Bytes::from(serde_json::to_vec(group)?);
        let resp = self
            .client
            .run(Method::Put, &self.group_path(name), API_VERSION, Some(body))
            .await?;
        resp.json()
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.client
            .run(Method::Delete, &self.group_path(name), API_VERSION, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::mock::{client, reply, MockTransport};
    use crate::error::Error;

    const GROUP_URL: &str = "https://management.azure.com/subscriptions/s/resourcegroups/rg";

    #[tokio::test]
    async fn existence_comes_from_the_head_status() {
        let transport = MockTransport::new(vec![reply(404, ""), reply(204, "")]);
        let groups = ResourceManagementClient::new(client(transport.clone()), "s");

        assert!(!groups.check_existence("rg").await.unwrap());
        assert!(groups.check_existence("rg").await.unwrap());
        assert_eq!(transport.paths(), vec![format!("HEAD {GROUP_URL}"); 2]);
    }

    #[tokio::test]
    async fn existence_check_surfaces_other_failures() {
        let transport = MockTransport::new(vec![reply(403, "")]);
        let groups = ResourceManagementClient::new(client(transport), "s");

        let err = groups.check_existence("rg").await.unwrap_err();
        assert_eq!(err.http_status(), Some(403));
    }

    #[tokio::test]
    async fn create_returns_the_group() {
        let transport = MockTransport::new(vec![reply(
            201,
            r#"{"id":"/subscriptions/s/resourceGroups/rg","name":"rg","location":"centralus","properties":{"provisioningState":"Succeeded"}}"#,
        )]);
        let groups = ResourceManagementClient::new(client(transport.clone()), "s");

        let group = groups
            .create_or_update("rg", &ResourceGroup::new("Central US"))
            .await
            .unwrap();
        assert_eq!(group.name.as_deref(), Some("rg"));
        assert_eq!(group.location, "centralus");
        assert_eq!(transport.paths(), vec![format!("PUT {GROUP_URL}")]);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_polls_the_location_until_done() {
        let transport = MockTransport::new(vec![
            reply(202, "")
                .header("location", "https://management.azure.com/operationresults/rg"),
            reply(202, ""),
            reply(200, ""),
        ]);
        let groups = ResourceManagementClient::new(client(transport.clone()), "s");

        groups.delete("rg").await.unwrap();
        assert_eq!(
            transport.paths(),
            vec![
                format!("DELETE {GROUP_URL}"),
                "GET https://management.azure.com/operationresults/rg".to_string(),
                "GET https://management.azure.com/operationresults/rg".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delete_that_ends_failed_is_an_error() {
        let transport = MockTransport::new(vec![
            reply(202, "")
                .header("location", "https://management.azure.com/operationresults/rg"),
            reply(200, r#"{"properties":{"provisioningState":"Failed"}}"#),
        ]);
        let groups = ResourceManagementClient::new(client(transport), "s");

        let err = groups.delete("rg").await.unwrap_err();
        assert!(matches!(err, Error::Operation(state) if state == "Failed"));
    }

    #[tokio::test]
    async fn deleting_a_missing_group_fails() {
        let transport = MockTransport::new(vec![reply(
            404,
            r#"{"error":{"code":"ResourceGroupNotFound","message":"Resource group 'rg' could not be found."}}"#,
        )]);
        let groups = ResourceManagementClient::new(client(transport), "s");

        let err = groups.delete("rg").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), Some("ResourceGroupNotFound"));
    }
}
