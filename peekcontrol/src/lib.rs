//! # peekcontrol - Cœur du point de contrôle UPnP
//!
//! Cette crate orchestre la couche protocole [`peekupnp`] en un point de
//! contrôle complet : découverte SSDP bornée, annuaire d'hôtes indexé,
//! énumération des descriptions de devices et invocation d'actions SOAP
//! typée.
//!
//! ## Architecture
//!
//! - [`discovery`] : session de découverte active/passive avec bornes
//!   (max hosts, timeout, annulation coopérative)
//! - [`directory`] : annuaire d'hôtes à indices stables, navigation par
//!   chemin, snapshots JSON versionnés
//! - [`enricher`] : récupération description.xml + SCPD et construction
//!   de l'arbre devices/services/actions
//! - [`invoker`] : invocation d'action avec collecte des arguments `in`
//!   et décodage des `out` (marshaling bin.base64 compris)
//! - [`detail`] : rendu texte du contenu d'un host
//! - [`model`] : structures de données de l'annuaire
//! - [`errors`] : taxonomie d'erreurs de la crate
//!
//! Les échanges réseau passent par des traits ([`DiscoveryTransport`],
//! [`DescriptionFetcher`], [`SoapCaller`], [`ValueProvider`]) pour que
//! chaque séquence soit testable sans socket.

pub mod detail;
pub mod directory;
pub mod discovery;
pub mod enricher;
pub mod errors;
pub mod invoker;
pub mod model;

pub use detail::{render_host_detail, render_host_summary};
pub use directory::{DirectorySnapshot, HostDirectory, SNAPSHOT_SCHEMA};
pub use discovery::{
    CancelToken, DiscoveryMode, DiscoveryOptions, DiscoveryReport, DiscoverySession,
    DiscoveryTransport, StopReason,
};
pub use enricher::{DescriptionEnricher, DescriptionFetcher, EnrichOutcome, HttpFetcher};
pub use errors::ControlPointError;
pub use invoker::{
    ActionInvoker, HttpSoapClient, InvokeOutcome, SoapCaller, SoapResponse, ValueProvider,
    join_control_url,
};
pub use model::{
    ActionInfo, ArgumentInfo, DeviceInfo, Direction, HostEntry, ServiceInfo, StateVariable,
};
