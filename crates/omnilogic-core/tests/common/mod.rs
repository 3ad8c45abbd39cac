#![allow(dead_code, clippy::unwrap_used)]

// Shared fixtures: a transport fed from a fixed script, plus builders
// for the wire documents the service would send.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use omnilogic_core::{ApiError, ClientConfig, Element, OmniLogic, Request, Token, Transport, Value};

pub const SYSTEM_ID: i32 = 5555;
pub const USER_ID: i64 = 31337;

enum Scripted {
    Xml(String),
    Error,
}

/// Transport that answers from a queue and records everything sent.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Request>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push_response(&self, xml: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Xml(xml.to_owned()));
    }

    /// Script a transport-level failure for the next send.
    pub fn push_error(&self) {
        self.responses.lock().unwrap().push_back(Scripted::Error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_command(&self, name: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.name == name)
            .count()
    }
}

/// The value a request carries for one named parameter.
pub fn param_value(request: &Request, name: &str) -> Option<Value> {
    request
        .parameters
        .iter()
        .find(|param| param.name == name)
        .map(|param| param.value.clone())
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Element, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Xml(xml)) => Ok(Element::parse(xml.as_bytes()).unwrap()),
            Some(Scripted::Error) => Err(ApiError::Api {
                status: 500,
                message: "scripted failure".into(),
            }),
            None => panic!(
                "transport script exhausted; unexpected command {}",
                request.name
            ),
        }
    }
}

/// Second owner of a scripted transport. The client boxes this; the
/// test keeps the `Arc` to push responses and inspect traffic.
pub struct SharedScript(pub Arc<ScriptedTransport>);

#[async_trait]
impl Transport for SharedScript {
    async fn send(&self, request: Request) -> Result<Element, ApiError> {
        self.0.send(request).await
    }
}

pub fn client_with(transport: &Arc<ScriptedTransport>) -> OmniLogic {
    OmniLogic::with_transport(
        ClientConfig::default(),
        Box::new(SharedScript(Arc::clone(transport))),
        Token {
            token: "jwt-test".into(),
            refresh_token: "jwt-test-refresh".into(),
        },
        USER_ID,
    )
    .unwrap()
}

/// A client already bound to [`SYSTEM_ID`] via a scripted `GetMspList`.
pub async fn connected_client(transport: &Arc<ScriptedTransport>) -> OmniLogic {
    transport.push_response(&msp_list_xml(0, &[(SYSTEM_ID, "Home Pool")]));
    let mut client = client_with(transport);
    client.connect().await.unwrap();
    client
}

// ── Wire document builders ──

pub fn msp_list_xml(status: i32, systems: &[(i32, &str)]) -> String {
    let items: String = systems
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<Item>
                     <Property name="MspSystemID">{id}</Property>
                     <Property name="BackyardName">{name}</Property>
                     <Property name="Address">1 Poolside Dr</Property>
                     <Property name="MessageVersion">1.11</Property>
                     <Property name="NeedShowPopupMessage">False</Property>
                   </Item>"#
            )
        })
        .collect();
    format!(
        r#"<Response>
             <Parameters>
               <Parameter name="Status" dataType="int">{status}</Parameter>
               <Parameter name="StatusMessage" dataType="string">Done</Parameter>
               <Parameter name="List" dataType="List">{items}</Parameter>
             </Parameters>
           </Response>"#
    )
}

pub fn ack_xml(command: &str, status: i32) -> String {
    format!(
        r#"<Response>
             <Parameters>
               <Parameter name="Name">{command}</Parameter>
               <Parameter name="Status">{status}</Parameter>
               <Parameter name="StatusMessage">Done</Parameter>
             </Parameters>
           </Response>"#
    )
}

/// Telemetry document builder. Positions correlate across kinds: the
/// i-th filter serves the i-th body of water.
pub struct BackyardFixture {
    /// `(system_id, water_temp)`
    pub bodies: Vec<(i32, i32)>,
    /// `(system_id, filter_speed, last_speed)`
    pub filters: Vec<(i32, i32, i32)>,
    /// `(system_id, current_set_point)`
    pub virtual_heaters: Vec<(i32, i32)>,
    /// `(system_id, heater_state)`
    pub heaters: Vec<(i32, i32)>,
    /// `(system_id, light_state)`
    pub lights: Vec<(i32, i32)>,
}

impl BackyardFixture {
    /// One pool: running pump 101, virtual heater 201, heater 301,
    /// light 401.
    pub fn standard() -> Self {
        Self {
            bodies: vec![(11, 84)],
            filters: vec![(101, 75, 85)],
            virtual_heaters: vec![(201, 85)],
            heaters: vec![(301, 1)],
            lights: vec![(401, 6)],
        }
    }

    pub fn xml(&self) -> String {
        let bodies: String = self
            .bodies
            .iter()
            .map(|(id, temp)| {
                format!(r#"<BodyOfWater systemId="{id}" flow="255" waterTemp="{temp}"/>"#)
            })
            .collect();
        let filters: String = self
            .filters
            .iter()
            .map(|(id, speed, last)| {
                format!(
                    r#"<Filter systemId="{id}" valvePosition="1" filterSpeed="{speed}"
                         filterState="1" whyFilterIsOn="1" fpOverride="0" lastSpeed="{last}"/>"#
                )
            })
            .collect();
        let virtual_heaters: String = self
            .virtual_heaters
            .iter()
            .map(|(id, set_point)| {
                format!(
                    r#"<VirtualHeater systemId="{id}" Current-Set-Point="{set_point}"
                         enable="yes" SolarSetPoint="90" Mode="0"/>"#
                )
            })
            .collect();
        let heaters: String = self
            .heaters
            .iter()
            .map(|(id, state)| {
                format!(
                    r#"<Heater systemId="{id}" heaterState="{state}" temp="84" enable="yes"
                         priority="254" maintainFor="24"/>"#
                )
            })
            .collect();
        let lights: String = self
            .lights
            .iter()
            .map(|(id, state)| {
                format!(
                    r#"<ColorLogic-Light systemId="{id}" lightState="{state}" currentShow="2"
                         speed="4" brightness="4" specialEffect="0"/>"#
                )
            })
            .collect();
        format!(
            r#"<STATUS version="1.11">
                 <Backyard systemId="0" statusVersion="11" airTemp="78" status="1" state="1"
                   mspVersion="R0408000" configUpdatedTime="2024-05-01T10:00:00"
                   datetime="2024-05-02T16:12:00" messageVersion="1.11"/>
                 {bodies}{filters}{virtual_heaters}{heaters}{lights}
               </STATUS>"#
        )
    }
}
