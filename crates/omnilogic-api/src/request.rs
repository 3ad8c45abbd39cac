// ── Tagged-value command codec ──
//
// Every command to the mobile endpoint is a `Request` document: a
// command name plus an ordered list of typed parameters. The service
// dispatches on the `dataType` attribute, so each parameter carries its
// wire kind alongside its text.

use xmltree::{Element, XMLNode};

/// A typed parameter value.
///
/// The wire knows exactly four scalar kinds. Anything else is
/// unrepresentable here, so an unsupported kind cannot reach the
/// serializer in the first place.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// The `dataType` attribute the service dispatches on.
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Bool(_) => "bool",
        }
    }

    /// The element text for this value.
    pub fn text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::Bool(v) => v.to_string(),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A named, typed command parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A command envelope: name plus ordered parameters.
///
/// Parameter order is preserved verbatim; the service is
/// position-sensitive on several commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub name: String,
    pub parameters: Vec<Param>,
}

impl Request {
    pub fn new(name: impl Into<String>, parameters: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Build the `<Request>` document for this command.
    pub fn to_document(&self) -> Element {
        let mut name = Element::new("Name");
        name.children.push(XMLNode::Text(self.name.clone()));

        let mut parameters = Element::new("Parameters");
        for param in &self.parameters {
            let mut el = Element::new("Parameter");
            el.attributes.insert("name".into(), param.name.clone());
            el.attributes
                .insert("dataType".into(), param.value.data_type().into());
            el.children.push(XMLNode::Text(param.value.text()));
            parameters.children.push(XMLNode::Element(el));
        }

        let mut root = Element::new("Request");
        root.children.push(XMLNode::Element(name));
        root.children.push(XMLNode::Element(parameters));
        root
    }

    /// Serialize the request to XML text.
    pub fn to_xml(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_document().write(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// The fixed "no timer" block appended to every equipment-state command.
///
/// The wire couples equipment toggling with an optional scheduling
/// feature; all-zero with `Recurring=false` means "just switch it".
pub fn timer_params() -> Vec<Param> {
    vec![
        Param::new("IsCountDownTimer", false),
        Param::new("StartTimeHours", 0),
        Param::new("StartTimeMinutes", 0),
        Param::new("EndTimeHours", 0),
        Param::new("EndTimeMinutes", 0),
        Param::new("DaysActive", 0),
        Param::new("Recurring", false),
    ]
}
