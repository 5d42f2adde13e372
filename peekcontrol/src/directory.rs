//! Annuaire ordonné des hosts découverts.
//!
//! Les index sont monotones et jamais réutilisés dans une session ; une
//! entrée n'est jamais retirée individuellement, l'annuaire n'est remplacé
//! qu'en bloc par un import. L'export/import passe par un snapshot JSON
//! versionné, inverse exact l'un de l'autre.

use crate::errors::ControlPointError;
use crate::model::{ActionInfo, ArgumentInfo, DeviceInfo, HostEntry, ServiceInfo, StateVariable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Version du schéma de snapshot reconnue par ce build.
pub const SNAPSHOT_SCHEMA: u32 = 1;

#[derive(Debug, Default)]
pub struct HostDirectory {
    hosts: Vec<HostEntry>,
    next_index: usize,
}

/// Snapshot auto-descriptif de l'annuaire complet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub schema: u32,
    pub hosts: Vec<HostEntry>,
}

impl HostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index qui sera attribué à la prochaine insertion.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Insère une entrée, lui attribue l'index suivant et le retourne.
    pub fn insert(&mut self, mut entry: HostEntry) -> usize {
        let index = self.next_index;
        entry.index = index;
        self.hosts.push(entry);
        self.next_index += 1;
        index
    }

    pub fn get(&self, index: usize) -> Result<&HostEntry, ControlPointError> {
        self.hosts
            .iter()
            .find(|h| h.index == index)
            .ok_or_else(|| host_index_error(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut HostEntry, ControlPointError> {
        self.hosts
            .iter_mut()
            .find(|h| h.index == index)
            .ok_or_else(|| host_index_error(index))
    }

    /// Présence d'une clé d'identité (dédoublonnage de la découverte).
    pub fn contains_identity(&self, identity: &str) -> bool {
        self.hosts.iter().any(|h| h.identity == identity)
    }

    /// Séquence ordonnée `(index, nom)` de tous les hosts connus.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> {
        self.hosts.iter().map(|h| (h.index, h.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Descente typée dans la structure d'un host.
    ///
    /// Chaque pas échoue indépendamment en nommant la clé et la profondeur
    /// (base 1) qui n'ont pas résolu.
    pub fn navigate<'a>(
        &'a self,
        index: usize,
        path: &[String],
    ) -> Result<Node<'a>, ControlPointError> {
        let mut node = Node::Host(self.get(index)?);
        for (depth, key) in path.iter().enumerate() {
            node = node.descend(key).ok_or_else(|| {
                ControlPointError::lookup(
                    format!("key '{}' at depth {}", key, depth + 1),
                    "try 'host info <index>' without arguments to list available keys",
                )
            })?;
        }
        Ok(node)
    }

    /// Snapshot complet de l'annuaire. `import(export())` est l'identité.
    pub fn export(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            schema: SNAPSHOT_SCHEMA,
            hosts: self.hosts.clone(),
        }
    }

    /// Remplace tout l'annuaire par le contenu d'un snapshot.
    ///
    /// Un schéma inconnu est refusé et l'annuaire reste inchangé.
    pub fn import(&mut self, snapshot: DirectorySnapshot) -> Result<(), ControlPointError> {
        if snapshot.schema != SNAPSHOT_SCHEMA {
            return Err(ControlPointError::Schema {
                found: snapshot.schema,
                expected: SNAPSHOT_SCHEMA,
            });
        }
        self.next_index = snapshot
            .hosts
            .iter()
            .map(|h| h.index + 1)
            .max()
            .unwrap_or(0);
        self.hosts = snapshot.hosts;
        Ok(())
    }

    /// Écrit le snapshot dans un fichier (JSON indenté).
    pub fn save_to(&self, path: &Path) -> Result<(), ControlPointError> {
        let json = serde_json::to_string_pretty(&self.export())
            .map_err(|e| ControlPointError::Snapshot(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ControlPointError::Snapshot(e.to_string()))?;
        info!("📦 directory snapshot written to {}", path.display());
        Ok(())
    }

    /// Recharge l'annuaire depuis un fichier de snapshot.
    pub fn load_from(&mut self, path: &Path) -> Result<usize, ControlPointError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ControlPointError::Snapshot(e.to_string()))?;
        let snapshot: DirectorySnapshot =
            serde_json::from_str(&json).map_err(|e| ControlPointError::Snapshot(e.to_string()))?;
        self.import(snapshot)?;
        Ok(self.hosts.len())
    }
}

fn host_index_error(index: usize) -> ControlPointError {
    ControlPointError::lookup(
        format!("host index {index}"),
        "try the 'host list' command to get a list of known hosts",
    )
}

/// Nœud typé de l'arbre d'introspection d'un host.
///
/// Variante taguée plutôt que structure générique : chaque niveau sait
/// quelles clés il expose, et `entries()` distingue feuilles et
/// sous-structures pour l'affichage générique.
#[derive(Debug)]
pub enum Node<'a> {
    Host(&'a HostEntry),
    DeviceList(&'a IndexMap<String, DeviceInfo>),
    Device(&'a DeviceInfo),
    ServiceList(&'a IndexMap<String, ServiceInfo>),
    Service(&'a ServiceInfo),
    ActionList(&'a IndexMap<String, ActionInfo>),
    Action(&'a ActionInfo),
    ArgumentList(&'a IndexMap<String, ArgumentInfo>),
    Argument(&'a ArgumentInfo),
    VariableList(&'a IndexMap<String, StateVariable>),
    Variable(&'a StateVariable),
    Leaf(String),
}

impl<'a> Node<'a> {
    /// Un pas de descente ; `None` si la clé n'existe pas à ce niveau.
    pub fn descend(&self, key: &str) -> Option<Node<'a>> {
        match self {
            Node::Host(host) => match key {
                "name" => Some(Node::Leaf(host.name.clone())),
                "identity" => Some(Node::Leaf(host.identity.clone())),
                "proto" => Some(Node::Leaf(host.base_proto.clone())),
                "xmlFile" => Some(Node::Leaf(host.description_location())),
                "dataComplete" => Some(Node::Leaf(host.data_complete.to_string())),
                "deviceList" => Some(Node::DeviceList(&host.device_list)),
                _ => None,
            },
            Node::DeviceList(devices) => devices.get(key).map(Node::Device),
            Node::Device(device) => match key {
                "deviceType" => leaf_opt(&device.device_type),
                "friendlyName" => leaf_opt(&device.friendly_name),
                "manufacturer" => leaf_opt(&device.manufacturer),
                "modelName" => leaf_opt(&device.model_name),
                "UDN" => leaf_opt(&device.udn),
                "services" => Some(Node::ServiceList(&device.services)),
                _ => None,
            },
            Node::ServiceList(services) => services.get(key).map(Node::Service),
            Node::Service(service) => match key {
                "fullName" => Some(Node::Leaf(service.full_name.clone())),
                "controlURL" => Some(Node::Leaf(service.control_url.clone())),
                "scpdURL" => Some(Node::Leaf(service.scpd_url.clone())),
                "actions" => Some(Node::ActionList(&service.actions)),
                "serviceStateVariables" => Some(Node::VariableList(&service.state_variables)),
                _ => None,
            },
            Node::ActionList(actions) => actions.get(key).map(Node::Action),
            Node::Action(action) => match key {
                "arguments" => Some(Node::ArgumentList(&action.arguments)),
                _ => None,
            },
            Node::ArgumentList(arguments) => arguments.get(key).map(Node::Argument),
            Node::Argument(argument) => match key {
                "direction" => Some(Node::Leaf(
                    match argument.direction {
                        crate::model::Direction::In => "in",
                        crate::model::Direction::Out => "out",
                    }
                    .to_string(),
                )),
                "relatedStateVariable" => {
                    Some(Node::Leaf(argument.related_state_variable.clone()))
                }
                _ => None,
            },
            Node::VariableList(variables) => variables.get(key).map(Node::Variable),
            Node::Variable(variable) => match key {
                "dataType" => Some(Node::Leaf(variable.data_type.to_string())),
                "allowedValueList" => variable
                    .allowed_values
                    .as_ref()
                    .map(|v| Node::Leaf(v.join(", "))),
                "allowedValueRange" => variable
                    .allowed_range
                    .as_ref()
                    .map(|(min, max)| Node::Leaf(format!("({min}, {max})"))),
                "defaultValue" => leaf_opt(&variable.default_value),
                _ => None,
            },
            Node::Leaf(_) => None,
        }
    }

    /// Paires `(clé, valeur)` de ce niveau : `Some(texte)` pour une
    /// feuille, `None` pour une sous-structure (affichée `{}`).
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        fn keys_of<T>(map: &IndexMap<String, T>) -> Vec<(String, Option<String>)> {
            map.keys().map(|k| (k.clone(), None)).collect()
        }

        let candidate_keys: Vec<&str> = match self {
            Node::Host(_) => vec![
                "name",
                "identity",
                "proto",
                "xmlFile",
                "dataComplete",
                "deviceList",
            ],
            Node::Device(_) => vec![
                "deviceType",
                "friendlyName",
                "manufacturer",
                "modelName",
                "UDN",
                "services",
            ],
            Node::Service(_) => vec![
                "fullName",
                "controlURL",
                "scpdURL",
                "actions",
                "serviceStateVariables",
            ],
            Node::Action(_) => vec!["arguments"],
            Node::Argument(_) => vec!["direction", "relatedStateVariable"],
            Node::Variable(_) => vec![
                "dataType",
                "allowedValueList",
                "allowedValueRange",
                "defaultValue",
            ],
            Node::DeviceList(m) => return keys_of(m),
            Node::ServiceList(m) => return keys_of(m),
            Node::ActionList(m) => return keys_of(m),
            Node::ArgumentList(m) => return keys_of(m),
            Node::VariableList(m) => return keys_of(m),
            Node::Leaf(v) => return vec![("value".to_string(), Some(v.clone()))],
        };

        candidate_keys
            .into_iter()
            .filter_map(|key| {
                self.descend(key).map(|node| match node {
                    Node::Leaf(v) => (key.to_string(), Some(v)),
                    _ => (key.to_string(), None),
                })
            })
            .collect()
    }
}

fn leaf_opt<'a>(value: &Option<String>) -> Option<Node<'a>> {
    value.as_ref().map(|v| Node::Leaf(v.clone()))
}
