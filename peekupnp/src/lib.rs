//! # peekupnp - plomberie protocolaire UPnP
//!
//! Ce crate regroupe les couches protocolaires consommées par le control
//! point : SSDP (découverte), SOAP (invocation d'actions), le décodage des
//! documents de description (description.xml et SCPD) et les tags de types
//! des state variables UPnP.
//!
//! Aucune logique de session ici : les politiques (bornage, dédoublonnage,
//! enrichissement) vivent dans `peekcontrol`.

pub mod description;
pub mod soap;
pub mod ssdp;
pub mod variable_types;

pub use description::{DeviceDescription, DescriptionParseError, Scpd};
pub use ssdp::{SsdpListener, SsdpMessage};
pub use variable_types::StateVarType;
