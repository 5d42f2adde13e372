//! SOAP Faults UPnP

use std::fmt;

/// Erreur SOAP (Fault)
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Client", "401")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Détails UPnP optionnels
    pub upnp_error: Option<UpnpError>,
}

/// Erreur UPnP spécifique
#[derive(Debug, Clone)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: "401", "501")
    pub error_code: String,

    /// Description de l'erreur
    pub error_description: String,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.upnp_error {
            Some(upnp) => write!(
                f,
                "{} ({}): UPnP error {}: {}",
                self.fault_code, self.fault_string, upnp.error_code, upnp.error_description
            ),
            None => write!(f, "{}: {}", self.fault_code, self.fault_string),
        }
    }
}
