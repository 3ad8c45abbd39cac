// ── Response envelope decoding ──
//
// Everything that is not telemetry answers with a `Response` envelope
// whose `Parameter` children are positional. Two shapes matter: the
// controller list behind `GetMspList`, and the three-field
// acknowledgement every equipment command returns.

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::error::Error;
use crate::xml::{child_elements, text_of};

/// One controller registered to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspSystem {
    pub msp_system_id: i32,
    pub backyard_name: String,
    pub address: String,
    pub message_version: String,
    pub need_show_popup_message: bool,
}

/// Decoded `GetMspList` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MspList {
    pub status: i32,
    pub status_message: String,
    pub systems: Vec<MspSystem>,
}

/// Acknowledgement for an equipment command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    /// Echoed command name. Some firmware leaves it blank.
    pub name: String,
    pub status: i32,
    pub status_message: String,
}

impl CommandAck {
    /// Zero is the service's only success code.
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Decode a `GetMspList` response document.
pub fn parse_msp_list(document: &Element) -> Result<MspList, Error> {
    let params = parameters(document)?;
    let status = param_i32(&params, 0)?;
    let status_message = text_of(param(&params, 1)?);

    // The list parameter is absent entirely for accounts with no
    // registered controllers.
    let systems = match params.get(2) {
        Some(container) => child_elements(container, "Item")
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                parse_system(item, &format!("Response/Parameters/Parameter[2]/Item[{i}]"))
            })
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    Ok(MspList {
        status,
        status_message,
        systems,
    })
}

/// Decode a command acknowledgement document.
///
/// The status code is the one field worth failing over; the echoed name
/// and the message degrade to empty strings.
pub fn parse_command_ack(document: &Element) -> Result<CommandAck, Error> {
    let params = parameters(document)?;
    Ok(CommandAck {
        name: params.first().copied().map_or_else(String::new, text_of),
        status: param_i32(&params, 1)?,
        status_message: params.get(2).copied().map_or_else(String::new, text_of),
    })
}

fn parse_system(item: &Element, path: &str) -> Result<MspSystem, Error> {
    let props = child_elements(item, "Property");
    Ok(MspSystem {
        msp_system_id: prop_i32(&props, path, 0)?,
        backyard_name: prop_text(&props, path, 1)?,
        address: prop_text(&props, path, 2)?,
        message_version: prop_text(&props, path, 3)?,
        need_show_popup_message: prop_text(&props, path, 4)?.eq_ignore_ascii_case("true"),
    })
}

// ── Envelope helpers ──

fn parameters(document: &Element) -> Result<Vec<&Element>, Error> {
    if document.name != "Response" {
        return Err(Error::parse(
            "Response",
            format!("unexpected root element {:?}", document.name),
        ));
    }
    let parameters = document
        .get_child("Parameters")
        .ok_or_else(|| Error::parse("Response/Parameters", "missing element"))?;
    Ok(child_elements(parameters, "Parameter"))
}

fn param<'a>(params: &[&'a Element], index: usize) -> Result<&'a Element, Error> {
    params.get(index).copied().ok_or_else(|| {
        Error::parse(
            format!("Response/Parameters/Parameter[{index}]"),
            "missing element",
        )
    })
}

fn param_i32(params: &[&Element], index: usize) -> Result<i32, Error> {
    let raw = text_of(param(params, index)?);
    raw.trim().parse().map_err(|_| {
        Error::parse(
            format!("Response/Parameters/Parameter[{index}]"),
            format!("not an integer: {raw:?}"),
        )
    })
}

fn prop<'a>(props: &[&'a Element], path: &str, index: usize) -> Result<&'a Element, Error> {
    props
        .get(index)
        .copied()
        .ok_or_else(|| Error::parse(format!("{path}/Property[{index}]"), "missing element"))
}

fn prop_text(props: &[&Element], path: &str, index: usize) -> Result<String, Error> {
    Ok(text_of(prop(props, path, index)?))
}

fn prop_i32(props: &[&Element], path: &str, index: usize) -> Result<i32, Error> {
    let raw = prop_text(props, path, index)?;
    raw.trim().parse().map_err(|_| {
        Error::parse(
            format!("{path}/Property[{index}]"),
            format!("not an integer: {raw:?}"),
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use xmltree::Element;

    use super::{parse_command_ack, parse_msp_list};
    use crate::error::Error;

    fn doc(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn msp_list_with_two_controllers() {
        let list = parse_msp_list(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter name="Status" dataType="int">0</Parameter>
                   <Parameter name="StatusMessage" dataType="string">Success</Parameter>
                   <Parameter name="List" dataType="List">
                     <Item>
                       <Property name="MspSystemID">12345</Property>
                       <Property name="BackyardName">Home Pool</Property>
                       <Property name="Address">1 Poolside Dr</Property>
                       <Property name="MessageVersion">1.11</Property>
                       <Property name="NeedShowPopupMessage">False</Property>
                     </Item>
                     <Item>
                       <Property name="MspSystemID">67890</Property>
                       <Property name="BackyardName">Lake House</Property>
                       <Property name="Address">9 Shoreline Rd</Property>
                       <Property name="MessageVersion">1.11</Property>
                       <Property name="NeedShowPopupMessage">True</Property>
                     </Item>
                   </Parameter>
                 </Parameters>
               </Response>"#,
        ))
        .unwrap();

        assert_eq!(list.status, 0);
        assert_eq!(list.status_message, "Success");
        assert_eq!(list.systems.len(), 2);
        assert_eq!(list.systems[0].msp_system_id, 12345);
        assert_eq!(list.systems[0].backyard_name, "Home Pool");
        assert!(!list.systems[0].need_show_popup_message);
        assert_eq!(list.systems[1].msp_system_id, 67890);
        assert!(list.systems[1].need_show_popup_message);
    }

    #[test]
    fn msp_list_without_list_parameter_is_empty() {
        let list = parse_msp_list(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter name="Status" dataType="int">0</Parameter>
                   <Parameter name="StatusMessage" dataType="string">Success</Parameter>
                 </Parameters>
               </Response>"#,
        ))
        .unwrap();
        assert!(list.systems.is_empty());
    }

    #[test]
    fn msp_list_missing_status_is_a_parse_error() {
        let result = parse_msp_list(&doc("<Response><Parameters/></Response>"));
        match result {
            Err(Error::Parse { path, .. }) => {
                assert_eq!(path, "Response/Parameters/Parameter[0]");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn msp_item_missing_property_reports_its_path() {
        let result = parse_msp_list(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter>0</Parameter>
                   <Parameter>Success</Parameter>
                   <Parameter>
                     <Item>
                       <Property>12345</Property>
                       <Property>Home Pool</Property>
                     </Item>
                   </Parameter>
                 </Parameters>
               </Response>"#,
        ));
        match result {
            Err(Error::Parse { path, .. }) => {
                assert_eq!(path, "Response/Parameters/Parameter[2]/Item[0]/Property[2]");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn ack_with_status_zero_is_success() {
        let ack = parse_command_ack(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter name="Name">SetUIEquipmentCmd</Parameter>
                   <Parameter name="Status">0</Parameter>
                   <Parameter name="StatusMessage">Command issued</Parameter>
                 </Parameters>
               </Response>"#,
        ))
        .unwrap();
        assert_eq!(ack.name, "SetUIEquipmentCmd");
        assert_eq!(ack.status, 0);
        assert_eq!(ack.status_message, "Command issued");
        assert!(ack.is_success());
    }

    #[test]
    fn ack_with_nonzero_status_is_failure() {
        let ack = parse_command_ack(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter name="Name">SetUIHeaterCmd</Parameter>
                   <Parameter name="Status">12</Parameter>
                   <Parameter name="StatusMessage">Invalid equipment</Parameter>
                 </Parameters>
               </Response>"#,
        ))
        .unwrap();
        assert_eq!(ack.status, 12);
        assert!(!ack.is_success());
    }

    #[test]
    fn ack_tolerates_missing_name_and_message() {
        let ack = parse_command_ack(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter/>
                   <Parameter>0</Parameter>
                 </Parameters>
               </Response>"#,
        ))
        .unwrap();
        assert_eq!(ack.name, "");
        assert_eq!(ack.status_message, "");
        assert!(ack.is_success());
    }

    #[test]
    fn ack_without_status_is_a_parse_error() {
        let result = parse_command_ack(&doc(
            r#"<Response>
                 <Parameters>
                   <Parameter>SetUIEquipmentCmd</Parameter>
                 </Parameters>
               </Response>"#,
        ));
        match result {
            Err(Error::Parse { path, .. }) => {
                assert_eq!(path, "Response/Parameters/Parameter[1]");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
