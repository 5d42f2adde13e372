//! Parsing des datagrammes SSDP et composition des M-SEARCH.

use super::{MAX_AGE, SSDP_MULTICAST_ADDR, SSDP_PORT};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::trace;

/// Datagramme SSDP classifié, vu d'un control point.
#[derive(Debug, Clone)]
pub enum SsdpMessage {
    /// NOTIFY ssdp:alive (annonce non sollicitée)
    Alive {
        usn: String,
        nt: String,
        location: String,
        server: String,
        max_age: u32,
        from: SocketAddr,
    },
    /// NOTIFY ssdp:byebye
    ByeBye {
        usn: String,
        nt: String,
        from: SocketAddr,
    },
    /// Réponse HTTP/200 à un M-SEARCH
    SearchResponse {
        usn: String,
        st: String,
        location: String,
        server: String,
        max_age: u32,
        from: SocketAddr,
    },
}

impl SsdpMessage {
    /// Classifie un datagramme SSDP. Les messages étrangers (M-SEARCH
    /// d'autres control points, lignes de statut inconnues) et les
    /// datagrammes sans les en-têtes requis donnent `None`.
    pub fn parse(data: &str, from: SocketAddr) -> Option<SsdpMessage> {
        let mut lines = data.lines();
        let first_line = lines.next()?.trim();
        let upper = first_line.to_ascii_uppercase();
        let headers = parse_headers(lines);

        let result = if upper.starts_with("NOTIFY ") {
            handle_notify(&headers, from)
        } else if upper.starts_with("HTTP/") && upper.contains(" 200 ") {
            handle_search_response(&headers, from)
        } else if upper.starts_with("M-SEARCH ") {
            // Un autre control point interroge le réseau ; nous ne sommes
            // pas un device, on ignore.
            None
        } else {
            trace!("Unknown SSDP message type from {}: {}", from, first_line);
            None
        };

        if result.is_none() {
            trace!("SSDP message from {} could not be parsed:\n{}", from, data);
        }

        result
    }

    /// Clé d'identité utilisée pour le dédoublonnage : USN si présent
    /// (identité unique par device dans la spec UPnP), sinon LOCATION.
    pub fn identity(&self) -> &str {
        match self {
            SsdpMessage::Alive { usn, location, .. }
            | SsdpMessage::SearchResponse { usn, location, .. } => {
                if usn.is_empty() { location } else { usn }
            }
            SsdpMessage::ByeBye { usn, .. } => usn,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            SsdpMessage::Alive { location, .. }
            | SsdpMessage::SearchResponse { location, .. } => Some(location),
            SsdpMessage::ByeBye { .. } => None,
        }
    }
}

fn handle_notify(headers: &HashMap<String, String>, from: SocketAddr) -> Option<SsdpMessage> {
    // En-têtes critiques : NTS, NT, USN (exigés par la spec UPnP)
    let nts = headers.get("NTS")?.to_ascii_lowercase();
    let nt = headers.get("NT")?.to_string();
    let usn = headers.get("USN")?.to_string();

    if nts == "ssdp:alive" {
        let location = match headers.get("LOCATION") {
            Some(loc) => loc.to_string(),
            None => {
                trace!(
                    "NOTIFY ssdp:alive from {} missing LOCATION header, ignoring",
                    from
                );
                return None;
            }
        };

        let server = headers
            .get("SERVER")
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let max_age = parse_max_age(headers.get("CACHE-CONTROL"));

        Some(SsdpMessage::Alive {
            usn,
            nt,
            location,
            server,
            max_age,
            from,
        })
    } else if nts == "ssdp:byebye" {
        Some(SsdpMessage::ByeBye { usn, nt, from })
    } else {
        trace!("Unknown NTS value from {}: {}", from, nts);
        None
    }
}

fn handle_search_response(
    headers: &HashMap<String, String>,
    from: SocketAddr,
) -> Option<SsdpMessage> {
    // En-têtes critiques : ST, USN, LOCATION
    let st = headers.get("ST")?.to_string();
    let usn = headers.get("USN")?.to_string();
    let location = match headers.get("LOCATION") {
        Some(loc) => loc.to_string(),
        None => {
            trace!(
                "M-SEARCH response from {} missing LOCATION header, ignoring",
                from
            );
            return None;
        }
    };

    let server = headers
        .get("SERVER")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let max_age = parse_max_age(headers.get("CACHE-CONTROL"));

    Some(SsdpMessage::SearchResponse {
        usn,
        st,
        location,
        server,
        max_age,
        from,
    })
}

/// Compose un M-SEARCH pour la cible `st`, avec les en-têtes
/// supplémentaires configurés par l'utilisateur (MAN, MX, ...).
pub fn build_msearch(st: &str, extra_headers: &IndexMap<String, String>) -> String {
    let mut request = format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST:{SSDP_MULTICAST_ADDR}:{SSDP_PORT}\r\n\
         ST:{st}\r\n"
    );
    for (header, value) in extra_headers {
        request.push_str(header);
        request.push(':');
        request.push_str(value);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");
    request
}

/// Parse les lignes d'en-tête d'un datagramme SSDP.
///
/// Les noms sont normalisés en majuscules ; la coupure se fait sur le
/// premier ':' seulement (les valeurs LOCATION en contiennent).
pub fn parse_headers<'a, I>(lines: I) -> HashMap<String, String>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim();

        // Ligne vide : fin des en-têtes
        if line.is_empty() {
            break;
        }

        if let Some(colon_pos) = line.find(':') {
            let (name, value_with_colon) = line.split_at(colon_pos);
            let value = &value_with_colon[1..];

            let name = name.trim().to_ascii_uppercase();
            let value = value.trim().to_string();

            if !name.is_empty() && !value.is_empty() {
                headers.insert(name, value);
            } else {
                trace!("Skipping malformed header: '{}'", line);
            }
        } else {
            trace!("Skipping line without colon: '{}'", line);
        }
    }
    headers
}

/// Extrait `max-age=<n>` d'un en-tête CACHE-CONTROL, avec repli sur la
/// valeur par défaut SSDP.
pub fn parse_max_age(value: Option<&String>) -> u32 {
    if let Some(v) = value {
        let lower = v.to_ascii_lowercase();
        if let Some(idx) = lower.find("max-age") {
            let after_key = &v[idx + 7..];
            let after_eq = after_key.trim_start().trim_start_matches('=').trim_start();
            let digits: String = after_eq
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(age) = digits.parse::<u32>() {
                return age;
            }
        }
        trace!(
            "Could not parse max-age from CACHE-CONTROL: '{}', using default {}",
            v, MAX_AGE
        );
    }
    MAX_AGE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_addr() -> SocketAddr {
        "192.168.1.42:1900".parse().unwrap()
    }

    #[test]
    fn test_parse_search_response() {
        let data = "HTTP/1.1 200 OK\r\n\
                    CACHE-CONTROL: max-age=1800\r\n\
                    LOCATION: http://192.168.1.42:49152/description.xml\r\n\
                    SERVER: Linux/3.4 UPnP/1.0 TestStack/1.0\r\n\
                    ST: upnp:rootdevice\r\n\
                    USN: uuid:abcd-1234::upnp:rootdevice\r\n\r\n";

        match SsdpMessage::parse(data, from_addr()) {
            Some(SsdpMessage::SearchResponse {
                usn,
                st,
                location,
                max_age,
                ..
            }) => {
                assert_eq!(usn, "uuid:abcd-1234::upnp:rootdevice");
                assert_eq!(st, "upnp:rootdevice");
                assert_eq!(location, "http://192.168.1.42:49152/description.xml");
                assert_eq!(max_age, 1800);
            }
            other => panic!("unexpected parse result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_notify_alive() {
        let data = "NOTIFY * HTTP/1.1\r\n\
                    HOST: 239.255.255.250:1900\r\n\
                    NT: upnp:rootdevice\r\n\
                    NTS: ssdp:alive\r\n\
                    USN: uuid:abcd-1234::upnp:rootdevice\r\n\
                    LOCATION: http://192.168.1.42:49152/description.xml\r\n\r\n";

        assert!(matches!(
            SsdpMessage::parse(data, from_addr()),
            Some(SsdpMessage::Alive { .. })
        ));
    }

    #[test]
    fn test_parse_notify_byebye() {
        let data = "NOTIFY * HTTP/1.1\r\n\
                    HOST: 239.255.255.250:1900\r\n\
                    NT: upnp:rootdevice\r\n\
                    NTS: ssdp:byebye\r\n\
                    USN: uuid:abcd-1234::upnp:rootdevice\r\n\r\n";

        assert!(matches!(
            SsdpMessage::parse(data, from_addr()),
            Some(SsdpMessage::ByeBye { .. })
        ));
    }

    #[test]
    fn test_foreign_msearch_is_ignored() {
        let data = "M-SEARCH * HTTP/1.1\r\n\
                    HOST: 239.255.255.250:1900\r\n\
                    MAN: \"ssdp:discover\"\r\n\
                    ST: ssdp:all\r\n\r\n";

        assert!(SsdpMessage::parse(data, from_addr()).is_none());
    }

    #[test]
    fn test_alive_without_location_is_dropped() {
        let data = "NOTIFY * HTTP/1.1\r\n\
                    NT: upnp:rootdevice\r\n\
                    NTS: ssdp:alive\r\n\
                    USN: uuid:abcd-1234\r\n\r\n";

        assert!(SsdpMessage::parse(data, from_addr()).is_none());
    }

    #[test]
    fn test_max_age_fallback() {
        assert_eq!(parse_max_age(None), MAX_AGE);
        assert_eq!(parse_max_age(Some(&"no-cache".to_string())), MAX_AGE);
        assert_eq!(parse_max_age(Some(&"max-age = 120".to_string())), 120);
    }

    #[test]
    fn test_build_msearch_carries_extra_headers() {
        let mut headers = IndexMap::new();
        headers.insert("MAN".to_string(), "\"ssdp:discover\"".to_string());
        headers.insert("MX".to_string(), "2".to_string());

        let request = build_msearch("upnp:rootdevice", &headers);
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("ST:upnp:rootdevice\r\n"));
        assert!(request.contains("MAN:\"ssdp:discover\"\r\n"));
        assert!(request.contains("MX:2\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_identity_prefers_usn() {
        let data = "HTTP/1.1 200 OK\r\n\
                    LOCATION: http://192.168.1.42:49152/description.xml\r\n\
                    ST: upnp:rootdevice\r\n\
                    USN: uuid:abcd-1234\r\n\r\n";
        let msg = SsdpMessage::parse(data, from_addr()).unwrap();
        assert_eq!(msg.identity(), "uuid:abcd-1234");
    }
}
