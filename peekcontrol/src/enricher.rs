//! Enrichissement à la demande d'une entrée de l'annuaire.
//!
//! L'enrichissement récupère le description document du host, puis le SCPD
//! de chacun de ses services, et assemble l'arbre complet
//! device/service/action/state-variable. Tout ou rien : la moindre panne
//! (réseau, document malformé) laisse l'entrée strictement inchangée et
//! remonte une seule erreur consolidée nommant le host et l'URL tentée.

use crate::errors::ControlPointError;
use crate::model::{
    ActionInfo, ArgumentInfo, DeviceInfo, Direction, HostEntry, ServiceInfo, StateVariable,
};
use indexmap::IndexMap;
use peekupnp::description::{DeviceDescription, Scpd};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Erreur de fetch d'un document de description.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Couture du fetch HTTP : scriptable dans les tests.
pub trait DescriptionFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher HTTP bloquant (ureq), timeout global par requête.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl DescriptionFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError(e.to_string()))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError(e.to_string()))
    }
}

/// Résultat d'un appel d'enrichissement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// L'entrée vient d'être complétée.
    Enriched,
    /// L'entrée était déjà complète : aucun fetch n'a eu lieu.
    AlreadyComplete,
}

pub struct DescriptionEnricher<F: DescriptionFetcher> {
    fetcher: F,
}

impl Default for DescriptionEnricher<HttpFetcher> {
    fn default() -> Self {
        Self::new(HttpFetcher::default())
    }
}

impl<F: DescriptionFetcher> DescriptionEnricher<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Complète une entrée : `device_list` est remplacé atomiquement et
    /// `data_complete` passe à `true`, uniquement si tous les fetchs et
    /// décodages réussissent.
    pub fn enrich(&self, entry: &mut HostEntry) -> Result<EnrichOutcome, ControlPointError> {
        if entry.data_complete {
            return Ok(EnrichOutcome::AlreadyComplete);
        }

        let location = entry.description_location();
        debug!("fetching description for {} at {}", entry.name, location);
        let xml = self
            .fetcher
            .fetch(&location)
            .map_err(|e| ControlPointError::description(&entry.name, &location, e))?;

        let tree = DeviceDescription::parse(&xml)
            .map_err(|e| ControlPointError::description(&entry.name, &location, e))?;

        // Les URLs relatives (SCPDURL, souvent sans URLBase) se résolvent
        // contre l'URL du description document.
        let base = Url::parse(&location)
            .map_err(|e| ControlPointError::description(&entry.name, &location, e))?;

        let mut device_list = IndexMap::new();
        for device in tree.devices {
            let mut services = IndexMap::new();
            for svc in &device.services {
                let Some(full_name) = svc.service_type.clone() else {
                    continue;
                };

                let scpd_url = match svc.scpd_url.as_deref() {
                    Some(rel) => base
                        .join(rel)
                        .map_err(|e| ControlPointError::description(&entry.name, rel, e))?
                        .to_string(),
                    None => {
                        // Pas de SCPD annoncé : service sans contrat
                        // d'actions, on le garde avec des maps vides.
                        String::new()
                    }
                };

                let (actions, state_variables) = if scpd_url.is_empty() {
                    (IndexMap::new(), IndexMap::new())
                } else {
                    debug!("fetching SCPD for {} at {}", full_name, scpd_url);
                    let scpd_xml = self
                        .fetcher
                        .fetch(&scpd_url)
                        .map_err(|e| ControlPointError::description(&entry.name, &scpd_url, e))?;
                    let scpd = Scpd::parse(&scpd_xml)
                        .map_err(|e| ControlPointError::description(&entry.name, &scpd_url, e))?;
                    assemble_contract(scpd)
                };

                services.insert(
                    svc.display_name(),
                    ServiceInfo {
                        full_name,
                        control_url: svc.control_url.clone().unwrap_or_default(),
                        scpd_url,
                        actions,
                        state_variables,
                    },
                );
            }

            device_list.insert(
                device.display_name(),
                DeviceInfo {
                    device_type: device.device_type,
                    friendly_name: device.friendly_name,
                    manufacturer: device.manufacturer,
                    model_name: device.model_name,
                    udn: device.udn,
                    services,
                },
            );
        }

        if device_list.is_empty() {
            return Err(ControlPointError::description(
                &entry.name,
                &location,
                "description document describes no devices",
            ));
        }

        entry.device_list = device_list;
        entry.data_complete = true;
        info!(
            "✅ host {} enumerated: {} device(s)",
            entry.name,
            entry.device_list.len()
        );
        Ok(EnrichOutcome::Enriched)
    }
}

fn assemble_contract(
    scpd: Scpd,
) -> (
    IndexMap<String, ActionInfo>,
    IndexMap<String, StateVariable>,
) {
    let mut actions = IndexMap::new();
    for action in scpd.actions {
        let mut arguments = IndexMap::new();
        for arg in action.arguments {
            arguments.insert(
                arg.name,
                ArgumentInfo {
                    direction: Direction::from_tag(&arg.direction),
                    related_state_variable: arg.related_state_variable,
                },
            );
        }
        actions.insert(action.name, ActionInfo { arguments });
    }

    let mut state_variables = IndexMap::new();
    for var in scpd.state_variables {
        state_variables.insert(
            var.name,
            StateVariable {
                data_type: var.data_type,
                allowed_values: var.allowed_values,
                allowed_range: var.allowed_range,
                default_value: var.default_value,
            },
        );
    }

    (actions, state_variables)
}
