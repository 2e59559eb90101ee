use crate::error::{Error, Result};

/// A parsed Azure Resource Manager identifier, e.g.
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Cdn/profiles/{p}/endpoints/{e}`.
///
/// Keys (`subscriptions`, `resourceGroups`, `providers`) match case-insensitively,
/// since the service itself is not consistent about their casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: Option<String>,
    pub provider: Option<String>,
    /// `(type, name)` pairs after the provider namespace, outermost first.
    pub resources: Vec<(String, String)>,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self> {
        let malformed = |reason| Error::ResourceId {
            id: id.to_string(),
            reason,
        };

        let rest = id
            .strip_prefix('/')
            .ok_or_else(|| malformed("must start with '/'"))?;
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(malformed("empty path segment"));
        }

        let mut it = segments.into_iter();
        let subscription_id = match (it.next(), it.next()) {
            (Some(key), Some(value)) if key.eq_ignore_ascii_case("subscriptions") => {
                value.to_string()
            }
            _ => return Err(malformed("missing subscription")),
        };

        let mut resource_group = None;
        let mut provider = None;
        let mut resources = vec![];
        while let Some(key) = it.next() {
            let value = it.next().ok_or_else(|| malformed("dangling path segment"))?;
            if provider.is_some() {
                resources.push((key.to_string(), value.to_string()));
            } else if key.eq_ignore_ascii_case("resourceGroups") && resource_group.is_none() {
                resource_group = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("providers") {
                provider = Some(value.to_string());
            } else {
                return Err(malformed("unexpected path segment"));
            }
        }

        if provider.is_some() && resources.is_empty() {
            return Err(malformed("provider without a resource type"));
        }

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            resources,
        })
    }
}
