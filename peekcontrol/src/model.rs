//! Modèle de données de l'annuaire des hosts découverts.
//!
//! Un [`HostEntry`] naît d'une réponse SSDP (squelette : adresse, URL de
//! description) puis est complété une seule fois par l'enrichissement
//! ([`crate::enricher`]), qui remplit `device_list` et fige
//! `data_complete`. Les maps imbriquées sont des `IndexMap` : l'ordre de
//! déclaration des documents XML est porteur de sens (ordre de prompt des
//! arguments) et doit survivre à l'aller-retour de sérialisation.

use indexmap::IndexMap;
use peekupnp::StateVarType;
use serde::{Deserialize, Serialize};
use url::Url;

/// Un host découvert sur le réseau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Index stable, attribué à l'insertion, jamais réutilisé dans une
    /// session.
    pub index: usize,

    /// Clé de dédoublonnage (USN, à défaut LOCATION). Jamais affichée
    /// comme identité principale.
    pub identity: String,

    /// Adresse d'affichage `host:port`, utilisée pour composer les URLs.
    pub name: String,

    /// Préfixe de schéma (`http://`) pour résoudre les URLs de contrôle.
    pub base_proto: String,

    /// Chemin du description document sur le host.
    pub description_url: String,

    /// Passe à `true` une seule fois, après un enrichissement réussi.
    pub data_complete: bool,

    /// Vide tant que `data_complete` est faux.
    pub device_list: IndexMap<String, DeviceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub udn: Option<String>,
    pub services: IndexMap<String, ServiceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Type complet du service, namespace de l'action SOAP.
    pub full_name: String,

    /// Chemin relatif de l'endpoint de contrôle.
    pub control_url: String,

    /// URL (résolue) du SCPD dont ce service a été décodé.
    pub scpd_url: String,

    pub actions: IndexMap<String, ActionInfo>,
    pub state_variables: IndexMap<String, StateVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInfo {
    /// Arguments dans l'ordre de déclaration du SCPD.
    pub arguments: IndexMap<String, ArgumentInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub direction: Direction,
    pub related_state_variable: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Décodage insensible à la casse ("In", "IN", "in"). Toute autre
    /// valeur est traitée comme `Out` : on ne prompte jamais sur un
    /// argument au sens inconnu.
    pub fn from_tag(tag: &str) -> Direction {
        if tag.eq_ignore_ascii_case("in") {
            Direction::In
        } else {
            Direction::Out
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVariable {
    pub data_type: StateVarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_range: Option<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl HostEntry {
    /// Construit le squelette d'une entrée depuis une réponse de
    /// découverte : l'en-tête LOCATION est éclaté en préfixe de schéma,
    /// adresse `host:port` et chemin du description document.
    pub fn from_location(index: usize, identity: &str, location: &str) -> Option<HostEntry> {
        let url = Url::parse(location).ok()?;
        let host = url.host_str()?;
        let name = match url.port_or_known_default() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let mut description_url = url.path().to_string();
        if let Some(query) = url.query() {
            description_url.push('?');
            description_url.push_str(query);
        }

        Some(HostEntry {
            index,
            identity: identity.to_string(),
            name,
            base_proto: format!("{}://", url.scheme()),
            description_url,
            data_complete: false,
            device_list: IndexMap::new(),
        })
    }

    /// URL absolue du description document.
    pub fn description_location(&self) -> String {
        format!("{}{}{}", self.base_proto, self.name, self.description_url)
    }
}
