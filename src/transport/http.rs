//! Lab management API client.
//!
//! Thin blocking session over the management REST API. Everything returned
//! to the core is normalized into the semantic types of `model`: ids become
//! strings, numeric status codes become the status enum, and the two wire
//! shapes for interface listings (array for qemu/vpcs sorts, map for iol)
//! both come out as an ordered interface list.

use std::collections::HashMap;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::api::{LabApi, LabRef};
use crate::error::{LinkError, Result};
use crate::model::{Interface, Network, Node, NodeStatus};

/// An authenticated session against the lab management API.
pub struct EveClient {
    http: reqwest::blocking::Client,
    base: String,
    tenant: String,
}

/// Standard response envelope of the management API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct RawAuth {
    tenant: FlexString,
}

#[derive(Debug, Deserialize)]
struct RawFolderListing {
    folders: Vec<RawFolder>,
    labs: Vec<RawLabEntry>,
}

#[derive(Debug, Deserialize)]
struct RawFolder {
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct RawLabEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct RawLab {
    id: String,
    name: String,
    filename: String,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: FlexString,
    name: String,
    #[serde(deserialize_with = "flex_u32")]
    status: u32,
}

#[derive(Debug, Deserialize)]
struct RawInterfaceListing {
    sort: String,
    ethernet: Value,
}

#[derive(Debug, Deserialize)]
struct RawEthernet {
    name: String,
    #[serde(deserialize_with = "flex_u32")]
    network_id: u32,
}

#[derive(Debug, Deserialize)]
struct RawNetwork {
    #[serde(rename = "type")]
    net_type: String,
    name: String,
    #[serde(deserialize_with = "flex_u32")]
    visibility: u32,
    #[serde(default, deserialize_with = "flex_u32_opt")]
    count: Option<u32>,
}

/// A user account as listed by the API, trimmed to the displayable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// The API is loose about number-vs-string typing; accept both.
#[derive(Debug, Clone)]
struct FlexString(String);

impl<'de> Deserialize<'de> for FlexString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => Ok(FlexString(s)),
            Value::Number(n) => Ok(FlexString(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }
}

fn flex_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_u32(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected integer, got {}", value)))
}

fn flex_u32_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    value_as_u32(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected integer, got {}", value)))
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn transport(err: impl std::fmt::Display) -> LinkError {
    LinkError::Transport(err.to_string())
}

/// API-safe form of a lab path (spaces are the only character the lab UI
/// lets through that needs escaping).
fn encode_path(path: &str) -> String {
    path.replace(' ', "%20")
}

impl EveClient {
    /// Log in and discover the session's tenant id.
    pub fn login(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .cookie_store(true)
            // lab hosts ship self-signed certificates
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(transport)?;

        let base = base_url.trim_end_matches('/').to_string();
        debug!("logging in to {}", base);
        let response = http
            .post(format!("{}/auth/login", base))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(LinkError::Transport(format!(
                "authentication failed for {} ({})",
                username,
                response.status()
            )));
        }

        let mut client = EveClient {
            http,
            base,
            tenant: String::new(),
        };
        let auth: RawAuth = client.get_data("/auth")?;
        client.tenant = auth.tenant.0;
        debug!("authenticated as tenant {}", client.tenant);
        Ok(client)
    }

    fn get_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base, endpoint);
        let response = self.http.get(&url).send().map_err(transport)?;
        if !response.status().is_success() {
            return Err(LinkError::Transport(format!(
                "GET {} returned {}",
                endpoint,
                response.status()
            )));
        }
        let envelope: Envelope<T> = response.json().map_err(transport)?;
        Ok(envelope.data)
    }

    /// All labs on the server, walking the folder tree breadth-first.
    pub fn list_labs(&self) -> Result<Vec<LabRef>> {
        let mut labs = Vec::new();
        let mut pending = vec!["/".to_string()];
        while let Some(folder) = pending.pop() {
            let listing: RawFolderListing =
                self.get_data(&format!("/folders{}", encode_path(&folder)))?;
            for sub in listing.folders {
                if sub.name == ".." {
                    continue;
                }
                pending.push(sub.path);
            }
            for entry in listing.labs {
                let detail: RawLab = self.get_data(&format!("/labs{}", encode_path(&entry.path)))?;
                labs.push(LabRef {
                    id: detail.id,
                    name: detail.name,
                    filename: detail.filename,
                    path: entry.path,
                });
            }
        }
        Ok(labs)
    }

    /// Find a lab by name or id substring. Ambiguous matches are an error
    /// so a typo never silently picks the wrong lab.
    pub fn find_lab(&self, needle: &str) -> Result<LabRef> {
        let labs = self.list_labs()?;
        select_lab(&labs, needle).cloned()
    }

    pub fn list_users(&self) -> Result<Vec<UserInfo>> {
        let raw: HashMap<String, UserInfo> = self.get_data("/users/")?;
        let mut users: Vec<UserInfo> = raw.into_values().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

/// Pick the single lab whose name or id contains `needle`. Nothing
/// matching and more than one match are both selection failures, not
/// transport failures.
pub fn select_lab<'a>(labs: &'a [LabRef], needle: &str) -> Result<&'a LabRef> {
    let matches: Vec<&LabRef> = labs
        .iter()
        .filter(|lab| lab.name.contains(needle) || lab.id.contains(needle))
        .collect();
    match matches.len() {
        0 => Err(LinkError::not_found(format!("lab {}", needle))),
        1 => Ok(matches[0]),
        n => Err(LinkError::not_found(format!(
            "lab {} is ambiguous, {} labs match; use a more specific name or the lab id",
            needle, n
        ))),
    }
}

impl LabApi for EveClient {
    fn tenant(&self) -> &str {
        &self.tenant
    }

    fn list_nodes(&self, lab: &LabRef) -> Result<Vec<Node>> {
        // an empty lab comes back as an empty array instead of a map
        let raw: Value = self.get_data(&format!("/labs{}/nodes", encode_path(&lab.path)))?;
        let map: HashMap<String, RawNode> = match raw {
            Value::Null => HashMap::new(),
            Value::Array(items) if items.is_empty() => HashMap::new(),
            other => serde_json::from_value(other).map_err(transport)?,
        };

        let mut nodes: Vec<Node> = map
            .into_values()
            .map(|node| Node {
                id: node.id.0,
                name: node.name,
                status: if node.status == 0 {
                    NodeStatus::Off
                } else {
                    NodeStatus::On
                },
            })
            .collect();
        nodes.sort_by(|a, b| {
            let (a, b) = (a.id.parse::<u32>().ok(), b.id.parse::<u32>().ok());
            a.cmp(&b)
        });
        Ok(nodes)
    }

    fn list_interfaces(&self, lab: &LabRef, node: &Node) -> Result<Vec<Interface>> {
        let listing: RawInterfaceListing = self.get_data(&format!(
            "/labs{}/nodes/{}/interfaces",
            encode_path(&lab.path),
            node.id
        ))?;

        let interfaces = match listing.sort.as_str() {
            // iol reports a map keyed by interface id
            "iol" => {
                let map: HashMap<String, RawEthernet> =
                    serde_json::from_value(listing.ethernet).map_err(transport)?;
                let mut entries: Vec<(String, RawEthernet)> = map.into_iter().collect();
                entries.sort_by_key(|(id, _)| id.parse::<u32>().unwrap_or(u32::MAX));
                entries
                    .into_iter()
                    .map(|(id, eth)| Interface {
                        id,
                        name: eth.name,
                        network_id: eth.network_id.to_string(),
                    })
                    .collect()
            }
            // qemu, vpcs and friends report an ordered array
            _ => {
                let list: Vec<RawEthernet> =
                    serde_json::from_value(listing.ethernet).map_err(transport)?;
                list.into_iter()
                    .enumerate()
                    .map(|(index, eth)| Interface {
                        id: index.to_string(),
                        name: eth.name,
                        network_id: eth.network_id.to_string(),
                    })
                    .collect()
            }
        };
        Ok(interfaces)
    }

    fn list_networks(&self, lab: &LabRef) -> Result<Vec<Network>> {
        let raw: Value = self.get_data(&format!("/labs{}/networks", encode_path(&lab.path)))?;
        let map: HashMap<String, RawNetwork> = match raw {
            Value::Null => HashMap::new(),
            Value::Array(items) if items.is_empty() => HashMap::new(),
            other => serde_json::from_value(other).map_err(transport)?,
        };

        let mut networks = Vec::new();
        for (id, network) in map {
            let id = id
                .parse()
                .map_err(|_| LinkError::Transport(format!("non-numeric network id {}", id)))?;
            networks.push(Network {
                id,
                net_type: network.net_type,
                name: network.name,
                visibility: network.visibility as u8,
                count: network.count.unwrap_or(0),
            });
        }
        networks.sort_by_key(|network| network.id);
        Ok(networks)
    }
}
