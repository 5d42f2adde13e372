//! Session de découverte SSDP bornée.
//!
//! La session pilote la boucle de réception (active après un M-SEARCH, ou
//! passive sur le listener multicast), applique le dédoublonnage et les
//! bornes max-hosts / timeout, et insère les nouveaux hosts dans
//! l'annuaire. Le bornage est coopératif : le timeout est porté par chaque
//! appel de réception, et le jeton d'annulation est consulté entre deux
//! réceptions. Timeout et annulation sont des fins de session normales,
//! jamais des erreurs ; les résultats partiels sont toujours conservés.

use crate::directory::HostDirectory;
use crate::model::HostEntry;
use indexmap::IndexMap;
use peekupnp::ssdp::{SearchTarget, SsdpListener, SsdpMessage, build_msearch};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Tranche de réception : borne supérieure de latence de détection des
/// conditions d'arrêt quand le réseau est silencieux.
const RECV_SLICE: Duration = Duration::from_secs(1);

/// Jeton d'annulation coopératif (Ctrl-C côté shell).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Réarme le jeton avant une nouvelle opération annulable.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Transport de découverte : la couture entre la session et le socket,
/// scriptable dans les tests.
pub trait DiscoveryTransport {
    fn send_search(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Réception bloquante, bornée en interne. `Ok(None)` signale une
    /// tranche écoulée sans datagramme ; `Err` une panne du transport.
    fn recv(&mut self) -> io::Result<Option<(String, SocketAddr)>>;
}

impl DiscoveryTransport for SsdpListener {
    fn send_search(&mut self, payload: &[u8]) -> io::Result<()> {
        self.send_multicast(payload)
    }

    fn recv(&mut self) -> io::Result<Option<(String, SocketAddr)>> {
        SsdpListener::recv(self, RECV_SLICE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// M-SEARCH puis collecte des réponses unicast.
    Active,
    /// Écoute seule des NOTIFY multicast.
    Passive,
}

/// Condition de fin d'une session, par ordre de priorité de détection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Annulation externe : résultats partiels conservés.
    Cancelled,
    /// La borne max-hosts est atteinte.
    MaxHostsReached,
    /// Le délai global est écoulé : fin normale, pas une erreur.
    TimedOut,
    /// Panne de réception : la boucle se termine proprement.
    TransportClosed,
}

/// Bilan d'une session de découverte.
#[derive(Debug)]
pub struct DiscoveryReport {
    /// Index des entrées insérées, dans l'ordre d'insertion.
    pub inserted: Vec<usize>,
    /// Réponses écartées par le dédoublonnage.
    pub duplicates: usize,
    pub stop: StopReason,
}

/// Paramètres d'une session.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub mode: DiscoveryMode,
    /// 0 = non borné.
    pub max_hosts: usize,
    /// `Duration::ZERO` = non borné.
    pub timeout: Duration,
    pub unique_only: bool,
    pub search_target: SearchTarget,
    /// En-têtes supplémentaires du M-SEARCH (MAN, MX, ...).
    pub extra_headers: IndexMap<String, String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        let mut extra_headers = IndexMap::new();
        extra_headers.insert("MAN".to_string(), "\"ssdp:discover\"".to_string());
        extra_headers.insert("MX".to_string(), "10".to_string());
        Self {
            mode: DiscoveryMode::Active,
            max_hosts: 0,
            timeout: Duration::ZERO,
            unique_only: true,
            search_target: SearchTarget::default(),
            extra_headers,
        }
    }
}

pub struct DiscoverySession {
    options: DiscoveryOptions,
}

impl DiscoverySession {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    /// Déroule la session et insère les hosts découverts dans l'annuaire.
    ///
    /// En mode actif, le listener unicast dédié est lié par l'appelant
    /// avant cet appel (l'échec de bind est donc remonté avant tout envoi).
    pub fn run(
        &self,
        directory: &mut HostDirectory,
        transport: &mut dyn DiscoveryTransport,
        cancel: &CancelToken,
    ) -> DiscoveryReport {
        let opts = &self.options;
        let mut inserted = Vec::new();
        let mut duplicates = 0usize;

        if opts.mode == DiscoveryMode::Active {
            let st = opts.search_target.to_string();
            let request = build_msearch(&st, &opts.extra_headers);
            debug!("📤 M-SEARCH for '{}'", st);
            if let Err(e) = transport.send_search(request.as_bytes()) {
                warn!("failed to send M-SEARCH: {}", e);
                return DiscoveryReport {
                    inserted,
                    duplicates,
                    stop: StopReason::TransportClosed,
                };
            }
        }

        let start = Instant::now();
        let stop = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if opts.max_hosts > 0 && inserted.len() >= opts.max_hosts {
                break StopReason::MaxHostsReached;
            }
            if !opts.timeout.is_zero() && start.elapsed() > opts.timeout {
                break StopReason::TimedOut;
            }

            let (data, from) = match transport.recv() {
                Ok(Some(datagram)) => datagram,
                Ok(None) => continue, // tranche écoulée, on reverifie les bornes
                Err(e) => {
                    warn!("discovery receive failed: {}", e);
                    break StopReason::TransportClosed;
                }
            };

            let Some(message) = SsdpMessage::parse(&data, from) else {
                continue;
            };
            let Some(location) = message.location() else {
                trace!("ignoring byebye from {}", from);
                continue;
            };

            let identity = message.identity().to_string();
            if opts.unique_only && directory.contains_identity(&identity) {
                trace!("duplicate identity '{}' dropped", identity);
                duplicates += 1;
                continue;
            }

            let Some(entry) =
                HostEntry::from_location(directory.next_index(), &identity, location)
            else {
                trace!("unusable LOCATION '{}' from {}", location, from);
                continue;
            };

            let name = entry.name.clone();
            let index = directory.insert(entry);
            info!("📥 host [{}] {} ({})", index, name, location);
            inserted.push(index);
        };

        debug!(
            "discovery session ended: {:?}, {} new host(s), {} duplicate(s)",
            stop,
            inserted.len(),
            duplicates
        );
        DiscoveryReport {
            inserted,
            duplicates,
            stop,
        }
    }
}
