//! Stateful client for Hayward OmniLogic pool controllers.
//!
//! This crate owns the session and equipment logic on top of
//! `omnilogic-api`:
//!
//! - **[`OmniLogic`]**: the client facade. Built from credentials or an
//!   existing token, bound to one controller by
//!   [`connect()`](OmniLogic::connect), then queried and commanded
//!   through typed getters and setters.
//!
//! - **Telemetry caching**: reads within a configurable window share one
//!   snapshot; any confirmed state change invalidates it so the next
//!   read observes the new reality.
//!
//! - **Token upkeep**: a background task refreshes the bearer token
//!   before it expires, for however long the client lives.
//!
//! - **Equipment addressing** ([`EquipmentId`]): operations accept either
//!   a raw system id or a borrowed status row, and the client resolves
//!   the owning body of water itself.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

mod cache;
mod refresh;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::OmniLogic;
pub use config::ClientConfig;
pub use error::CoreError;
pub use model::{EquipmentId, WaterTemperature, light_state};

// Wire-level types consumers handle directly. `Transport` implementers
// additionally need the request codec and the api error type.
pub use omnilogic_api::Error as ApiError;
pub use omnilogic_api::auth::{AuthConfig, Session, Token};
pub use omnilogic_api::request::{Param, Request, Value};
pub use omnilogic_api::response::{CommandAck, MspList, MspSystem};
pub use omnilogic_api::telemetry::{
    BackyardStatus,
    BodyOfWaterStatus,
    ChlorinatorStatus,
    ColorLogicLightStatus,
    CsadStatus,
    FilterStatus,
    GroupStatus,
    HeaterStatus,
    Telemetry,
    VirtualHeaterStatus,
};
pub use omnilogic_api::{Element, Transport, TransportConfig};
