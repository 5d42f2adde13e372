//! Décodage streaming du description document (arbre de devices).

use super::{DescribedDevice, DescribedService, DescriptionParseError, DeviceDescription};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::trace;

impl DeviceDescription {
    /// Décode un description document complet.
    ///
    /// Les devices embarqués (`<deviceList>`) sont aplatis dans l'ordre du
    /// document ; un document sans aucun `<device>` est une erreur.
    pub fn parse(xml: &str) -> Result<DeviceDescription, DescriptionParseError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut parsed = DeviceDescription::default();

        // Les devices embarqués imposent une pile : les services et champs
        // texte s'attachent au device le plus profond.
        let mut device_stack: Vec<DescribedDevice> = Vec::new();
        let mut current_service: Option<DescribedService> = None;
        let mut current_tag: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "device" => {
                            device_stack.push(DescribedDevice::default());
                            current_tag = None;
                        }
                        "service" => {
                            if !device_stack.is_empty() {
                                current_service = Some(DescribedService::default());
                                current_tag = None;
                            }
                        }
                        _ => {
                            if !device_stack.is_empty() {
                                current_tag = Some(name);
                            }
                        }
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "device" => {
                            if let Some(done) = device_stack.pop() {
                                parsed.devices.push(done);
                            }
                        }
                        "service" => {
                            if let (Some(service), Some(device)) =
                                (current_service.take(), device_stack.last_mut())
                            {
                                if service.service_type.is_some() {
                                    device.services.push(service);
                                } else {
                                    trace!("service without serviceType skipped");
                                }
                            }
                        }
                        _ => {}
                    }
                    current_tag = None;
                }
                Event::Text(e) => {
                    let Some(tag) = &current_tag else { continue };
                    let text = e.decode()?.into_owned();

                    if let Some(service) = current_service.as_mut() {
                        match tag.as_str() {
                            "serviceType" => service.service_type = Some(text),
                            "serviceId" => service.service_id = Some(text),
                            "controlURL" => service.control_url = Some(text),
                            "eventSubURL" => service.event_sub_url = Some(text),
                            "SCPDURL" => service.scpd_url = Some(text),
                            _ => {}
                        }
                    } else if let Some(device) = device_stack.last_mut() {
                        match tag.as_str() {
                            "deviceType" => device.device_type = Some(text),
                            "friendlyName" => device.friendly_name = Some(text),
                            "manufacturer" => device.manufacturer = Some(text),
                            "modelName" => device.model_name = Some(text),
                            "UDN" => device.udn = Some(text),
                            _ => {}
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        if parsed.devices.is_empty() {
            return Err(DescriptionParseError::NoDevice);
        }

        Ok(parsed)
    }
}
