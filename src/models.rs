//! Wire models for the resource and CDN management APIs.

use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resource_id::ResourceId;

/// One page of an ARM list call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    pub location: String,
}

impl ResourceGroup {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }
}

/// CDN pricing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SkuName {
    #[serde(rename = "Standard_Microsoft")]
    #[value(name = "Standard_Microsoft")]
    StandardMicrosoft,
    #[serde(rename = "Standard_Akamai")]
    #[value(name = "Standard_Akamai")]
    StandardAkamai,
    #[serde(rename = "Standard_Verizon")]
    #[value(name = "Standard_Verizon")]
    StandardVerizon,
    #[serde(rename = "Premium_Verizon")]
    #[value(name = "Premium_Verizon")]
    PremiumVerizon,
    #[serde(other)]
    #[value(skip)]
    Other,
}

impl SkuName {
    pub fn is_standard(&self) -> bool {
        matches!(
            self,
            SkuName::StandardMicrosoft | SkuName::StandardAkamai | SkuName::StandardVerizon
        )
    }
}

impl Display for SkuName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkuName::StandardMicrosoft => "Standard_Microsoft",
            SkuName::StandardAkamai => "Standard_Akamai",
            SkuName::StandardVerizon => "Standard_Verizon",
            SkuName::PremiumVerizon => "Premium_Verizon",
            SkuName::Other => "<other>",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: SkuName,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub resource_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub sku: Sku,
    #[serde(default)]
    pub properties: ProfileProperties,
}

impl Profile {
    /// The resource group the profile lives in, read from its ARM id.
    pub fn resource_group(&self) -> Result<String> {
        let id = ResourceId::parse(&self.id)?;
        id.resource_group.ok_or_else(|| crate::Error::ResourceId {
            id: self.id.clone(),
            reason: "profile id has no resource group",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileCreateParameters {
    pub location: String,
    pub sku: Sku,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepCreatedOriginProperties {
    pub host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_port: Option<u16>,
}

/// An origin embedded in an endpoint at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepCreatedOrigin {
    pub name: String,
    pub properties: DeepCreatedOriginProperties,
}

impl DeepCreatedOrigin {
    pub fn new(name: impl Into<String>, host_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: DeepCreatedOriginProperties {
                host_name: host_name.into(),
                http_port: None,
                https_port: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointProperties {
    #[serde(default, skip_serializing)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub origins: Vec<DeepCreatedOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_http_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_https_allowed: Option<bool>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing)]
    pub resource_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub properties: EndpointProperties,
}

impl Endpoint {
    pub fn host_name(&self) -> &str {
        self.properties.host_name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointCreateParameters {
    pub location: String,
    pub properties: EndpointProperties,
}

impl EndpointCreateParameters {
    /// An endpoint serving over both HTTP and HTTPS from the given origins.
    pub fn new(location: impl Into<String>, origins: Vec<DeepCreatedOrigin>) -> Self {
        Self {
            location: location.into(),
            properties: EndpointProperties {
                origins,
                is_http_allowed: Some(true),
                is_https_allowed: Some(true),
                ..EndpointProperties::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeParameters {
    pub content_paths: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_resource_group_comes_from_id() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourcegroups/media-rg/providers/Microsoft.Cdn/profiles/media",
            "name": "media",
            "location": "Global",
            "sku": { "name": "Standard_Microsoft" },
            "properties": { "provisioningState": "Succeeded", "resourceState": "Active" }
        }))
        .unwrap();
        assert_eq!(profile.resource_group().unwrap(), "media-rg");
        assert!(profile.sku.name.is_standard());
    }

    #[test]
    fn unknown_sku_still_deserializes() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Cdn/profiles/fd",
            "name": "fd",
            "sku": { "name": "Premium_AzureFrontDoor" }
        }))
        .unwrap();
        assert_eq!(profile.sku.name, SkuName::Other);
    }

    #[test]
    fn endpoint_create_body() {
        let params = EndpointCreateParameters::new(
            "Central US",
            vec![DeepCreatedOrigin::new("contoso-origin", "www.contoso.com")],
        );
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "location": "Central US",
                "properties": {
                    "origins": [
                        { "name": "contoso-origin", "properties": { "hostName": "www.contoso.com" } }
                    ],
                    "isHttpAllowed": true,
                    "isHttpsAllowed": true
                }
            })
        );
    }

    #[test]
    fn endpoint_host_name_and_page() {
        let page: Page<Endpoint> = serde_json::from_value(json!({
            "value": [{
                "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Cdn/profiles/p/endpoints/e",
                "name": "e",
                "properties": { "hostName": "e.azureedge.net", "origins": [] }
            }],
            "nextLink": "https://management.azure.com/next"
        }))
        .unwrap();
        assert_eq!(page.value[0].host_name(), "e.azureedge.net");
        assert_eq!(page.next_link.as_deref(), Some("https://management.azure.com/next"));

        let empty: Page<Endpoint> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.value.is_empty());
    }

    #[test]
    fn resource_group_body_is_location_only() {
        assert_eq!(
            serde_json::to_value(ResourceGroup::new("Central US")).unwrap(),
            json!({ "location": "Central US" })
        );
    }
}
