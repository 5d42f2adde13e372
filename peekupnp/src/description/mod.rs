//! # Décodage des documents de description UPnP
//!
//! Deux documents distincts :
//!
//! - le *description document* (description.xml) annoncé dans l'en-tête
//!   LOCATION : arbre de devices (racine + embarqués) et leurs services ;
//! - le *SCPD* de chaque service : actions, arguments et state variables.
//!
//! Le décodage est en streaming (quick-xml) ; le fetch HTTP appartient au
//! control point, pas à ce module.

mod parser;
mod scpd;

pub use scpd::{Scpd, ScpdAction, ScpdArgument, ScpdStateVariable};

/// Erreur de décodage d'un document de description ou d'un SCPD.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionParseError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("text decoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("description document contains no <device> element")]
    NoDevice,
}

/// Arbre de devices décodé depuis un description document.
#[derive(Debug, Clone, Default)]
pub struct DeviceDescription {
    /// Devices du document (racine puis embarqués), dans l'ordre de
    /// déclaration.
    pub devices: Vec<DescribedDevice>,
}

/// Un `<device>` du description document.
#[derive(Debug, Clone, Default)]
pub struct DescribedDevice {
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub udn: Option<String>,
    pub services: Vec<DescribedService>,
}

/// Un `<service>` déclaré par un device.
#[derive(Debug, Clone, Default)]
pub struct DescribedService {
    pub service_type: Option<String>,
    pub service_id: Option<String>,
    pub control_url: Option<String>,
    pub event_sub_url: Option<String>,
    pub scpd_url: Option<String>,
}

impl DescribedDevice {
    /// Nom court d'affichage : le segment nom d'un deviceType urn
    /// (`urn:schemas-upnp-org:device:InternetGatewayDevice:1` →
    /// `InternetGatewayDevice`), ou le friendlyName à défaut.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.device_type.as_deref().and_then(urn_name_segment) {
            return name.to_string();
        }
        self.friendly_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl DescribedService {
    /// Nom court d'affichage, extrait du serviceType urn.
    pub fn display_name(&self) -> String {
        self.service_type
            .as_deref()
            .and_then(urn_name_segment)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Segment nom d'un URN UPnP : `urn:<domain>:<kind>:<name>:<version>`.
fn urn_name_segment(urn: &str) -> Option<&str> {
    let mut parts = urn.split(':');
    if parts.next()? != "urn" {
        return None;
    }
    parts.next()?; // domain
    parts.next()?; // device | service
    parts.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urn_name_segment() {
        assert_eq!(
            urn_name_segment("urn:schemas-upnp-org:device:InternetGatewayDevice:1"),
            Some("InternetGatewayDevice")
        );
        assert_eq!(urn_name_segment("upnp:rootdevice"), None);
    }
}
