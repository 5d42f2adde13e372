/*!
Sockets UDP du control point SSDP.

Deux sockets distincts, jamais le même :

* L'écoute *passive* (NOTIFY) doit être liée à 0.0.0.0:1900 et rejoindre le
  groupe multicast.
* Les réponses aux M-SEARCH arrivent en *unicast* sur le socket émetteur ;
  il doit donc être lié sur un port éphémère (0.0.0.0:0), sinon le noyau
  répartit les datagrammes entre les deux sockets et des réponses se perdent.
*/

use super::{SSDP_MULTICAST_ADDR, SSDP_PORT};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, warn};

/// Socket SSDP côté control point.
pub struct SsdpListener {
    socket: UdpSocket,
}

impl SsdpListener {
    /// Ouvre le socket multicast partagé (écoute passive des NOTIFY).
    ///
    /// Rejoint le groupe SSDP sur chaque interface IPv4 non-loopback, ou
    /// uniquement sur `iface` si un nom d'interface est fourni. L'échec du
    /// bind est remonté tel quel ; l'échec d'un join sur une interface est
    /// seulement loggé.
    pub fn open_multicast(iface: Option<&str>) -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;

        let bind_addr: SocketAddr = format!("0.0.0.0:{SSDP_PORT}")
            .parse()
            .expect("static bind address");
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        socket.set_multicast_loop_v4(true)?;

        let group: Ipv4Addr = SSDP_MULTICAST_ADDR.parse().expect("static group address");
        let mut joined = 0usize;
        for candidate in get_if_addrs::get_if_addrs()? {
            if let std::net::IpAddr::V4(ipv4) = candidate.ip() {
                if ipv4.is_loopback() {
                    continue;
                }
                if let Some(name) = iface {
                    if candidate.name != name {
                        continue;
                    }
                }
                match socket.join_multicast_v4(&group, &ipv4) {
                    Ok(()) => {
                        debug!("SSDP: joined {} on {} ({})", group, ipv4, candidate.name);
                        joined += 1;
                    }
                    Err(e) => {
                        warn!("SSDP: failed to join {} on {}: {}", group, ipv4, e);
                    }
                }
            }
        }

        if joined == 0 {
            // Pas d'interface candidate : le bind a réussi mais aucune
            // annonce multicast n'arrivera. On le signale comme un échec
            // d'installation du listener.
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                match iface {
                    Some(name) => format!("no usable IPv4 address on interface '{name}'"),
                    None => "no non-loopback IPv4 interface available".to_string(),
                },
            ));
        }

        debug!("✅ SSDP multicast listener ready on {}", bind_addr);
        Ok(Self { socket })
    }

    /// Ouvre un socket unicast éphémère pour un M-SEARCH.
    pub fn open_unicast() -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;

        let bind_addr: SocketAddr = "0.0.0.0:0".parse().expect("static bind address");
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        debug!(
            "✅ SSDP unicast listener ready on {}",
            socket.local_addr()?
        );
        Ok(Self { socket })
    }

    /// Envoie un datagramme au groupe multicast SSDP.
    pub fn send_multicast(&self, payload: &[u8]) -> io::Result<()> {
        let addr: SocketAddr = format!("{SSDP_MULTICAST_ADDR}:{SSDP_PORT}")
            .parse()
            .expect("static multicast address");
        self.socket.send_to(payload, addr)?;
        Ok(())
    }

    /// Réception bloquante bornée par `timeout`.
    ///
    /// `Ok(None)` signale l'expiration du délai (WouldBlock / TimedOut) ;
    /// toute autre erreur d'E/S est remontée.
    pub fn recv(&self, timeout: Duration) -> io::Result<Option<(String, SocketAddr)>> {
        self.socket
            .set_read_timeout(Some(timeout.max(Duration::from_millis(10))))?;

        let mut buf = [0u8; 8192];
        match self.socket.recv_from(&mut buf) {
            Ok((n, from)) => {
                let data = String::from_utf8_lossy(&buf[..n]).into_owned();
                Ok(Some((data, from)))
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
