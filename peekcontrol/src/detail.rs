//! Rendu texte du détail complet d'un host.
//!
//! Le même rendu sert à l'affichage à l'écran et à l'export texte sur
//! disque : une chaîne unique, arborescence indentée, dans l'ordre de
//! déclaration des documents du device.

use crate::model::{Direction, HostEntry};
use std::fmt::Write;

/// Détail complet d'un host : identité, devices, services, actions avec
/// leurs arguments, state variables avec types et contraintes.
pub fn render_host_detail(entry: &HostEntry) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Host: {} (index {})", entry.name, entry.index);
    let _ = writeln!(out, "\tidentity: {}", entry.identity);
    let _ = writeln!(
        out,
        "\txml file: {}{}{}",
        entry.base_proto, entry.name, entry.description_url
    );
    let _ = writeln!(out, "\tdata complete: {}", entry.data_complete);

    for (device_name, device) in &entry.device_list {
        let _ = writeln!(out, "\tdevice: {}", device_name);
        for (label, value) in [
            ("deviceType", &device.device_type),
            ("friendlyName", &device.friendly_name),
            ("manufacturer", &device.manufacturer),
            ("modelName", &device.model_name),
            ("UDN", &device.udn),
        ] {
            if let Some(value) = value {
                let _ = writeln!(out, "\t\t{}: {}", label, value);
            }
        }

        for (service_name, service) in &device.services {
            let _ = writeln!(out, "\t\tservice: {}", service_name);
            let _ = writeln!(out, "\t\t\tfullName: {}", service.full_name);
            let _ = writeln!(out, "\t\t\tcontrolURL: {}", service.control_url);
            let _ = writeln!(out, "\t\t\tSCPDURL: {}", service.scpd_url);

            for (action_name, action) in &service.actions {
                let _ = writeln!(out, "\t\t\taction: {}", action_name);
                for (arg_name, arg) in &action.arguments {
                    let dir = match arg.direction {
                        Direction::In => "in",
                        Direction::Out => "out",
                    };
                    let _ = writeln!(
                        out,
                        "\t\t\t\t{} ({}) -> {}",
                        arg_name, dir, arg.related_state_variable
                    );
                }
            }

            for (var_name, var) in &service.state_variables {
                let _ = writeln!(
                    out,
                    "\t\t\tstate variable: {} ({})",
                    var_name, var.data_type
                );
                if let Some(values) = &var.allowed_values {
                    let _ = writeln!(out, "\t\t\t\tallowed values: {}", values.join(", "));
                }
                if let Some((min, max)) = &var.allowed_range {
                    let _ = writeln!(out, "\t\t\t\tallowed range: {} .. {}", min, max);
                }
                if let Some(default) = &var.default_value {
                    let _ = writeln!(out, "\t\t\t\tdefault: {}", default);
                }
            }
        }
    }

    out
}

/// Résumé court d'un host : une ligne par device avec son friendlyName.
pub fn render_host_summary(entry: &HostEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Host: {} (index {})", entry.name, entry.index);
    if !entry.data_complete {
        let _ = writeln!(out, "\t(not enumerated yet)");
        return out;
    }
    for (device_name, device) in &entry.device_list {
        let friendly = device.friendly_name.as_deref().unwrap_or("?");
        let _ = writeln!(out, "\t{} - {}", device_name, friendly);
        for service_name in device.services.keys() {
            let _ = writeln!(out, "\t\t{}", service_name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HostEntry;

    #[test]
    fn test_render_unenriched_host() {
        let entry = HostEntry::from_location(
            0,
            "uuid:test::rootdevice",
            "http://192.168.1.10:49152/rootDesc.xml",
        )
        .unwrap();
        let text = render_host_detail(&entry);
        assert!(text.contains("Host: 192.168.1.10:49152 (index 0)"));
        assert!(text.contains("data complete: false"));

        let summary = render_host_summary(&entry);
        assert!(summary.contains("not enumerated yet"));
    }
}
