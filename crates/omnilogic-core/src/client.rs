// ── Client facade ──
//
// One `OmniLogic` per account session, bound to one controller by
// `connect()`. All operations take `&mut self`: the facade owns its
// cache and index outright and serializes access by construction. The
// only shared state is the token cell, which the background refresh
// task swaps from its side.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use omnilogic_api::Transport;
use omnilogic_api::auth::{AuthClient, Token};
use omnilogic_api::request::{Param, Request, timer_params};
use omnilogic_api::response::{parse_command_ack, parse_msp_list};
use omnilogic_api::telemetry::{
    ColorLogicLightStatus, FilterStatus, Telemetry, VirtualHeaterStatus, parse_telemetry,
};
use omnilogic_api::transport::HttpTransport;
use secrecy::SecretString;
use tracing::{debug, info};

use crate::cache::{EquipmentIndex, TelemetryCache};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{EquipmentId, WaterTemperature, light_state};
use crate::refresh::{RefreshHandle, TokenState, expiry_from_login, spawn_refresh_task};

/// Client for one OmniLogic account, bound to one controller.
///
/// Construct with [`with_credentials`](Self::with_credentials) or
/// [`with_token`](Self::with_token), then call
/// [`connect()`](Self::connect) before anything else. Reads are served
/// from a short-lived telemetry cache; state changes send exactly one
/// command, and only a service-confirmed change invalidates the cache.
///
/// Dropping the client aborts its background token refresh; call
/// [`close()`](Self::close) to shut it down gracefully.
pub struct OmniLogic {
    transport: Box<dyn Transport>,
    token: Arc<ArcSwap<TokenState>>,
    user_id: i64,
    system_id: Option<i32>,
    cache: TelemetryCache,
    index: EquipmentIndex,
    refresh: Option<RefreshHandle>,
}

impl OmniLogic {
    /// Log in and build a client from the resulting session.
    pub async fn with_credentials(
        config: ClientConfig,
        email: &str,
        password: &SecretString,
    ) -> Result<Self, CoreError> {
        let auth = AuthClient::new(&config.auth)?;
        let session = auth.login(email, password).await?;
        let state = TokenState {
            expires_at: Some(expiry_from_login(Utc::now(), session.expires_in)),
            token: session.token,
        };
        let transport = HttpTransport::new(&config.transport)?;
        Ok(Self::assemble(
            Box::new(transport),
            auth,
            state,
            session.user_id,
            &config,
        ))
    }

    /// Build a client around a previously saved token pair.
    ///
    /// The token's remaining lifetime is unknown, so the background
    /// task refreshes it at its first check and tracks it from there.
    pub fn with_token(config: ClientConfig, token: Token, user_id: i64) -> Result<Self, CoreError> {
        let auth = AuthClient::new(&config.auth)?;
        let transport = HttpTransport::new(&config.transport)?;
        let state = TokenState {
            token,
            expires_at: None,
        };
        Ok(Self::assemble(
            Box::new(transport),
            auth,
            state,
            user_id,
            &config,
        ))
    }

    /// Build a client over an arbitrary [`Transport`].
    ///
    /// This is how tests substitute the wire; production callers want
    /// [`with_credentials`](Self::with_credentials) or
    /// [`with_token`](Self::with_token).
    pub fn with_transport(
        config: ClientConfig,
        transport: Box<dyn Transport>,
        token: Token,
        user_id: i64,
    ) -> Result<Self, CoreError> {
        let auth = AuthClient::new(&config.auth)?;
        let state = TokenState {
            token,
            expires_at: None,
        };
        Ok(Self::assemble(transport, auth, state, user_id, &config))
    }

    fn assemble(
        transport: Box<dyn Transport>,
        auth: AuthClient,
        state: TokenState,
        user_id: i64,
        config: &ClientConfig,
    ) -> Self {
        let token = Arc::new(ArcSwap::from_pointee(state));
        let refresh = spawn_refresh_task(
            auth,
            Arc::clone(&token),
            config.token_check_interval,
            config.token_refresh_threshold,
        );
        Self {
            transport,
            token,
            user_id,
            system_id: None,
            cache: TelemetryCache::new(config.cache_validity),
            index: EquipmentIndex::default(),
            refresh: Some(refresh),
        }
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Bind this client to the account's first registered controller.
    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let request = Request::new(
            "GetMspList",
            vec![
                Param::new("token", self.current_token()),
                Param::new("OwnerID", self.user_id),
            ],
        );
        let document = self.transport.send(request).await?;
        let list = parse_msp_list(&document)?;
        if list.status != 0 {
            return Err(CoreError::Api {
                message: format!(
                    "GetMspList failed (status {}): {}",
                    list.status, list.status_message
                ),
            });
        }
        let Some(first) = list.systems.first() else {
            return Err(CoreError::NotConnected {
                message: "no controllers registered to this account".into(),
            });
        };
        self.system_id = Some(first.msp_system_id);
        info!(system_id = first.msp_system_id, name = %first.backyard_name, "connected");
        Ok(())
    }

    /// The controller bound by [`connect()`](Self::connect), if any.
    pub fn system_id(&self) -> Option<i32> {
        self.system_id
    }

    /// The account id this client operates as.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// The current token pair, including background refreshes. Save
    /// this to skip the login next time.
    pub fn token(&self) -> Token {
        self.token.load().token.clone()
    }

    /// Stop the background token refresh and wait for it to wind down.
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.stop().await;
        }
    }

    // ── Telemetry ────────────────────────────────────────────────────

    /// The current telemetry snapshot.
    ///
    /// Served from cache while the last fetch is inside the validity
    /// window; otherwise fetched fresh and cached.
    pub async fn telemetry(&mut self) -> Result<Arc<Telemetry>, CoreError> {
        let system_id = self.require_system_id()?;
        if let Some(snapshot) = self.cache.get() {
            debug!("telemetry served from cache");
            return Ok(snapshot);
        }

        let request = Request::new(
            "RequestTelemetryData",
            vec![
                Param::new("token", self.current_token()),
                Param::new("MspSystemID", system_id),
            ],
        );
        let document = self.transport.send(request).await?;
        let snapshot = Arc::new(parse_telemetry(&document)?);
        self.cache.store(Arc::clone(&snapshot));
        debug!(bodies = snapshot.bodies_of_water.len(), "telemetry refreshed");
        Ok(snapshot)
    }

    /// Forget the cached snapshot. The next read goes to the wire.
    pub fn clear_telemetry_cache(&mut self) {
        self.cache.clear();
    }

    /// Drop the cache and fetch a fresh snapshot unconditionally.
    pub async fn refresh_telemetry(&mut self) -> Result<Arc<Telemetry>, CoreError> {
        self.cache.clear();
        self.telemetry().await
    }

    /// Rebuild the equipment index from (possibly cached) telemetry.
    pub async fn update_equipment_body_map(&mut self) -> Result<(), CoreError> {
        let snapshot = self.telemetry().await?;
        self.index.rebuild(&snapshot);
        Ok(())
    }

    // ── Equipment reads ──────────────────────────────────────────────

    pub async fn get_pumps(&mut self) -> Result<Vec<FilterStatus>, CoreError> {
        Ok(self.telemetry().await?.filters.clone())
    }

    pub async fn get_heaters(&mut self) -> Result<Vec<VirtualHeaterStatus>, CoreError> {
        Ok(self.telemetry().await?.virtual_heaters.clone())
    }

    pub async fn get_lights(&mut self) -> Result<Vec<ColorLogicLightStatus>, CoreError> {
        Ok(self.telemetry().await?.color_logic_lights.clone())
    }

    /// Current speed percentage of one pump.
    pub async fn get_pump_speed(
        &mut self,
        pump: impl EquipmentId + Send,
    ) -> Result<i32, CoreError> {
        let id = pump.system_id();
        let snapshot = self.telemetry().await?;
        snapshot
            .filters
            .iter()
            .find(|f| f.system_id == id)
            .map(|f| f.filter_speed)
            .ok_or_else(|| CoreError::Equipment {
                message: format!("no pump with system id {id}"),
            })
    }

    /// Current setpoint of one virtual heater.
    pub async fn get_heater_temperature(
        &mut self,
        heater: impl EquipmentId + Send,
    ) -> Result<i32, CoreError> {
        let id = heater.system_id();
        let snapshot = self.telemetry().await?;
        snapshot
            .virtual_heaters
            .iter()
            .find(|h| h.system_id == id)
            .map(|h| h.current_set_point)
            .ok_or_else(|| CoreError::Equipment {
                message: format!("no heater with system id {id}"),
            })
    }

    /// Whether one light is actually lit.
    ///
    /// Only state code 6 counts: a light powering on (4) or powering
    /// off (7) reports `false`.
    pub async fn get_light_state(
        &mut self,
        light: impl EquipmentId + Send,
    ) -> Result<bool, CoreError> {
        let id = light.system_id();
        let snapshot = self.telemetry().await?;
        snapshot
            .color_logic_lights
            .iter()
            .find(|l| l.system_id == id)
            .map(|l| l.light_state == light_state::ON)
            .ok_or_else(|| CoreError::Equipment {
                message: format!("no light with system id {id}"),
            })
    }

    /// Water temperature of the first actively circulating circuit.
    ///
    /// Readings are positional: the running filter's index selects the
    /// body of water, virtual heater, and heater it serves. Without a
    /// running pump there is no circulating water to measure.
    pub async fn get_water_temperature(&mut self) -> Result<WaterTemperature, CoreError> {
        let snapshot = self.telemetry().await?;
        if snapshot.bodies_of_water.is_empty() {
            return Err(CoreError::Equipment {
                message: "no bodies of water in telemetry".into(),
            });
        }
        let index = snapshot
            .filters
            .iter()
            .position(|f| f.filter_speed > 0)
            .ok_or_else(|| CoreError::Equipment {
                message: "no running pump; water temperature needs an active circuit".into(),
            })?;
        let body = snapshot
            .bodies_of_water
            .get(index)
            .ok_or_else(|| CoreError::Equipment {
                message: format!("no body of water at position {index}"),
            })?;
        let virtual_heater =
            snapshot
                .virtual_heaters
                .get(index)
                .ok_or_else(|| CoreError::Equipment {
                    message: format!("no virtual heater at position {index}"),
                })?;
        let heater = snapshot.heaters.get(index).ok_or_else(|| CoreError::Equipment {
            message: format!("no heater at position {index}"),
        })?;
        Ok(WaterTemperature {
            current: body.water_temp,
            target: virtual_heater.current_set_point,
            heater_on: heater.heater_state == 1,
        })
    }

    // ── Equipment commands ───────────────────────────────────────────

    /// Set a pump's speed percentage. `Ok(false)` means the service
    /// declined the command.
    pub async fn set_pump_speed(
        &mut self,
        pump: impl EquipmentId + Send,
        speed: i32,
    ) -> Result<bool, CoreError> {
        let id = pump.system_id();
        if !(0..=100).contains(&speed) {
            return Err(CoreError::ValidationFailed {
                message: format!("pump speed must be between 0 and 100, got {speed}"),
            });
        }
        let system_id = self.require_system_id()?;
        let pool_id = self.body_for(id).await?;
        let request = self.equipment_command(system_id, pool_id, id, speed);
        self.dispatch(request).await
    }

    /// Start a pump at the speed it last ran at.
    pub async fn set_pump_on(&mut self, pump: &FilterStatus) -> Result<bool, CoreError> {
        let system_id = self.require_system_id()?;
        let pool_id = self.body_for(pump.system_id).await?;
        let request = self.equipment_command(system_id, pool_id, pump.system_id, pump.last_speed);
        self.dispatch(request).await
    }

    /// Set a virtual heater's target temperature.
    pub async fn set_heater_temperature(
        &mut self,
        heater: impl EquipmentId + Send,
        target: i32,
    ) -> Result<bool, CoreError> {
        let id = heater.system_id();
        // The mobile app advertises a 40 degree minimum; the service
        // enforces 50.
        if !(50..=105).contains(&target) {
            return Err(CoreError::ValidationFailed {
                message: format!("heater temperature must be between 50 and 105, got {target}"),
            });
        }
        let system_id = self.require_system_id()?;
        let pool_id = self.body_for(id).await?;
        let request = Request::new(
            "SetUIHeaterCmd",
            vec![
                Param::new("token", self.current_token()),
                Param::new("MspSystemID", system_id),
                Param::new("PoolID", pool_id),
                Param::new("HeaterID", id),
                Param::new("Temp", target),
            ],
        );
        self.dispatch(request).await
    }

    /// Enable or disable a virtual heater.
    pub async fn set_heater_state(
        &mut self,
        heater: impl EquipmentId + Send,
        on: bool,
    ) -> Result<bool, CoreError> {
        let id = heater.system_id();
        let system_id = self.require_system_id()?;
        let pool_id = self.body_for(id).await?;
        // This command spells its flag out as text, unlike the 1/0
        // convention every other toggle uses.
        let enabled = if on { "true" } else { "false" };
        let request = Request::new(
            "SetHeaterEnable",
            vec![
                Param::new("token", self.current_token()),
                Param::new("MspSystemID", system_id),
                Param::new("PoolID", pool_id),
                Param::new("HeaterID", id),
                Param::new("Enabled", enabled),
            ],
        );
        self.dispatch(request).await
    }

    /// Switch a light on or off.
    pub async fn set_light_state(
        &mut self,
        light: impl EquipmentId + Send,
        on: bool,
    ) -> Result<bool, CoreError> {
        let id = light.system_id();
        let system_id = self.require_system_id()?;
        let pool_id = self.body_for(id).await?;
        let request = self.equipment_command(system_id, pool_id, id, i32::from(on));
        self.dispatch(request).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn current_token(&self) -> String {
        self.token.load().token.token.clone()
    }

    fn require_system_id(&self) -> Result<i32, CoreError> {
        self.system_id.ok_or_else(|| CoreError::NotConnected {
            message: "system id not set, did you call `connect()`?".into(),
        })
    }

    /// The body of water owning `equipment_id`.
    ///
    /// Cache-aside on the index: check, on miss rebuild exactly once,
    /// re-check, then give up.
    async fn body_for(&mut self, equipment_id: i32) -> Result<i32, CoreError> {
        if let Some(body) = self.index.body_of(equipment_id) {
            return Ok(body);
        }
        self.update_equipment_body_map().await?;
        self.index
            .body_of(equipment_id)
            .ok_or_else(|| CoreError::Equipment {
                message: format!("could not find body of water for equipment {equipment_id}"),
            })
    }

    /// The shared equipment-state command.
    ///
    /// The trailing block belongs to a scheduling feature this client
    /// never uses; the service wants it spelled out anyway.
    fn equipment_command(
        &self,
        system_id: i32,
        pool_id: i32,
        equipment_id: i32,
        value: i32,
    ) -> Request {
        let mut parameters = vec![
            Param::new("token", self.current_token()),
            Param::new("MspSystemID", system_id),
            Param::new("PoolID", pool_id),
            Param::new("EquipmentId", equipment_id),
            Param::new("IsOn", value),
        ];
        parameters.extend(timer_params());
        Request::new("SetUIEquipmentCmd", parameters)
    }

    /// Send a command and fold its acknowledgement into `bool`.
    ///
    /// A confirmed change clears the telemetry cache so the next read
    /// observes it. A declined command leaves the cache alone, as does
    /// any error on the way out.
    async fn dispatch(&mut self, request: Request) -> Result<bool, CoreError> {
        let command = request.name.clone();
        let document = self.transport.send(request).await?;
        let ack = parse_command_ack(&document)?;
        if ack.is_success() {
            self.cache.clear();
            debug!(%command, "command accepted");
            Ok(true)
        } else {
            debug!(%command, status = ack.status, message = %ack.status_message, "command rejected");
            Ok(false)
        }
    }
}

impl Drop for OmniLogic {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
    }
}
