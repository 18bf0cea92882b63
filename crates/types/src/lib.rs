use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the prefix tree as served by `/data/{vrf}/{token}`.
///
/// Children are shallow: they carry enough to build a link and a follow-up
/// request, never their own descendants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixNode {
    pub prefix: String,
    #[serde(default, deserialize_with = "vrf_name")]
    pub vrf: Option<String>,
    #[serde(default)]
    pub child_prefixes: Vec<ChildPrefix>,
}

impl PrefixNode {
    pub fn is_leaf(&self) -> bool {
        self.child_prefixes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildPrefix {
    pub prefix: String,
    #[serde(default, deserialize_with = "vrf_name")]
    pub vrf: Option<String>,
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

/// Tenant attached to an address or prefix.
///
/// Exports carry either a bare name, a numeric id or the full tenant record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Tenant {
    Name(String),
    Id(i64),
    Record {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        id: Option<i64>,
    },
    Other(Value),
}

impl Tenant {
    /// Text shown to the user, or `None` for empty values.
    pub fn label(&self) -> Option<String> {
        match self {
            Tenant::Name(name) if !name.is_empty() => Some(name.clone()),
            Tenant::Id(id) if *id != 0 => Some(id.to_string()),
            Tenant::Record { name: Some(name), .. } if !name.is_empty() => Some(name.clone()),
            Tenant::Record { id: Some(id), .. } if *id != 0 => Some(id.to_string()),
            Tenant::Other(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Tenant::Other(Value::Bool(true)) => Some("true".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub address: String,
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub prefix: String,
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

/// Hit-region payload for one visualization image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverlayPayload {
    #[serde(default)]
    pub ip_addresses: Vec<AddressRect>,
    #[serde(default)]
    pub child_prefixes: Vec<PrefixRect>,
}

// VRFs are exported either by name or by numeric id.
fn vrf_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(de::Error::custom(format!("unsupported vrf value: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_without_vrf_or_children() {
        let node: PrefixNode = serde_json::from_str(r#"{"prefix": "10.0.0.0/8"}"#).unwrap();
        assert_eq!(node.vrf, None);
        assert!(node.is_leaf());
    }

    #[test]
    fn node_with_numeric_vrf_and_children() {
        let node: PrefixNode = serde_json::from_str(
            r#"{
                "prefix": "10.0.0.0/16",
                "vrf": 7,
                "child_prefixes": [
                    {"id": 1, "prefix": "10.0.1.0/24", "vrf": null, "tenant": {"id": 3, "name": "ops"}},
                    {"id": 2, "prefix": "10.0.2.0/24", "vrf": "blue", "tenant": null}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(node.vrf.as_deref(), Some("7"));
        assert_eq!(
            node.child_prefixes,
            vec![
                ChildPrefix {
                    prefix: "10.0.1.0/24".to_string(),
                    vrf: None,
                    tenant: Some(Tenant::Record { name: Some("ops".to_string()), id: Some(3) }),
                },
                ChildPrefix {
                    prefix: "10.0.2.0/24".to_string(),
                    vrf: Some("blue".to_string()),
                    tenant: None,
                },
            ]
        );
    }

    #[test]
    fn rejects_structured_vrf() {
        let result = serde_json::from_str::<PrefixNode>(r#"{"prefix": "10.0.0.0/8", "vrf": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn tenant_labels_follow_truthiness() {
        assert_eq!(Tenant::Name("acme".into()).label().as_deref(), Some("acme"));
        assert_eq!(Tenant::Name(String::new()).label(), None);
        assert_eq!(Tenant::Id(12).label().as_deref(), Some("12"));
        assert_eq!(Tenant::Id(0).label(), None);
        assert_eq!(Tenant::Record { name: None, id: Some(4) }.label().as_deref(), Some("4"));
        assert_eq!(Tenant::Other(Value::Bool(false)).label(), None);
    }

    #[test]
    fn overlay_payload_defaults_missing_collections() {
        let payload: OverlayPayload = serde_json::from_str(
            r#"{"ip_addresses": [{"x": 1, "y": 2, "width": 3, "height": 4, "address": "10.0.0.1", "tenant": "acme"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.ip_addresses.len(), 1);
        assert_eq!(payload.ip_addresses[0].tenant, Some(Tenant::Name("acme".into())));
        assert!(payload.child_prefixes.is_empty());
    }
}
