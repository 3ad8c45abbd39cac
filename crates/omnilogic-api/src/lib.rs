// omnilogic-api: wire-level client for the Hayward OmniLogic cloud API.
//
// Two distinct surfaces, two distinct formats:
// - the auth service speaks JSON (login, token refresh),
// - the mobile endpoint speaks XML command envelopes (telemetry,
//   controller discovery, equipment commands).
// `omnilogic-core` composes these into a stateful client.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod telemetry;
pub mod transport;

mod xml;

pub use error::Error;
pub use request::{Param, Request, Value};
pub use transport::{HttpTransport, Transport, TransportConfig};

// The document type the transport boundary trades in.
pub use xmltree::Element;
