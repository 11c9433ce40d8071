//! The router: bridge authorization, interpreter lookup and program dispatch.

use crate::interpreter::owners;
use crate::interpreter::{
    Contract, ExecContext, ExecutionError, ExecutionResult, Host, Interpreter, Origin,
    escrow_address,
};
use crate::program::{AssetId, NetworkId, codec};
use crate::router::config::RouterConfig;
use crate::router::errors::RouterError;
use crate::router::events::RouterEvent;
use crate::router::registry::Registry;
use crate::state::{Ledger, MemoryState, OverlayState, State};
use crate::types::address::Address;
use crate::{info, warn};
use std::collections::{BTreeSet, HashMap};

/// Maps `(network, account)` origins to interpreters and runs the programs
/// bridges deliver for them.
///
/// Generic over the state backend; [`Router::new`] runs on [`MemoryState`].
/// Every entry point takes `&mut self`, so one router processes one call at a
/// time.
pub struct Router<S: State = MemoryState> {
    config: RouterConfig,
    escrow: Address,
    registry: Registry,
    interpreters: HashMap<Origin, Interpreter>,
    state: S,
    events: Vec<RouterEvent>,
}

impl Router<MemoryState> {
    /// Creates a router with an empty in-memory state.
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        Self::with_state(config, MemoryState::new())
    }
}

impl<S: State> Router<S> {
    pub fn with_state(config: RouterConfig, state: S) -> Result<Self, RouterError> {
        config.validate()?;
        info!(
            "Initializing router: network={} admin={} unit_scale={}",
            config.network_id, config.admin, config.unit_scale
        );
        Ok(Self {
            escrow: escrow_address(config.network_id),
            config,
            registry: Registry::new(),
            interpreters: HashMap::new(),
            state,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn network_id(&self) -> NetworkId {
        self.config.network_id
    }

    fn require_admin(&self, caller: &Address, action: &'static str) -> Result<(), RouterError> {
        if *caller != self.config.admin {
            warn!("Rejected {caller}: not authorized to {action}");
            return Err(RouterError::Unauthorized {
                caller: *caller,
                action,
            });
        }
        Ok(())
    }

    /// Associates `bridge` with `network`. Re-registration replaces the
    /// previous bridge.
    pub fn register_bridge(
        &mut self,
        caller: &Address,
        bridge: Address,
        network: NetworkId,
    ) -> Result<(), RouterError> {
        self.require_admin(caller, "register bridges")?;
        if let Some(previous) = self.registry.register_bridge(network, bridge) {
            warn!("Bridge for network {network} replaced: {previous} -> {bridge}");
        } else {
            info!("Registered bridge {bridge} for network {network}");
        }
        self.events.push(RouterEvent::BridgeRegistered { network, bridge });
        Ok(())
    }

    /// Maps `asset` to the ledger token `handle`. The first mapping is final.
    pub fn register_asset(
        &mut self,
        caller: &Address,
        handle: Address,
        asset: AssetId,
    ) -> Result<(), RouterError> {
        self.require_admin(caller, "register assets")?;
        self.registry.register_asset(handle, asset)?;
        info!("Registered asset {asset} as token {handle}");
        self.events.push(RouterEvent::AssetRegistered { asset, handle });
        Ok(())
    }

    /// Makes `contract` callable at `address` from Call instructions.
    pub fn register_contract(
        &mut self,
        caller: &Address,
        address: Address,
        contract: impl Contract + 'static,
    ) -> Result<(), RouterError> {
        self.require_admin(caller, "register contracts")?;
        self.registry.register_contract(address, Box::new(contract))?;
        info!("Registered contract {address}");
        self.events.push(RouterEvent::ContractRegistered { address });
        Ok(())
    }

    /// Issues `amount` of `asset` to `holder` on the ledger.
    ///
    /// This is how bridges are funded to cover incoming assets.
    pub fn mint(
        &mut self,
        caller: &Address,
        asset: AssetId,
        holder: Address,
        amount: u128,
    ) -> Result<(), RouterError> {
        self.require_admin(caller, "mint")?;
        let token = self.token(asset)?;
        self.state
            .credit(&token, &holder, amount)
            .map_err(ExecutionError::from)?;
        Ok(())
    }

    /// Returns the interpreter address for `origin`, creating the interpreter
    /// if it does not exist yet.
    pub fn create_interpreter(&mut self, origin: Origin) -> Address {
        if let Some(interpreter) = self.interpreters.get(&origin) {
            return interpreter.address();
        }
        let interpreter = Interpreter::new(origin);
        owners::init(&mut self.state, &interpreter.address(), origin.account);
        self.record_created(interpreter)
    }

    fn record_created(&mut self, interpreter: Interpreter) -> Address {
        let origin = *interpreter.origin();
        let address = interpreter.address();
        info!("Created interpreter {address} for {origin}");
        self.interpreters.insert(origin, interpreter);
        self.events.push(RouterEvent::InterpreterCreated {
            origin,
            interpreter: address,
        });
        address
    }

    /// Decodes and executes a program delivered by `caller` for `origin`.
    ///
    /// `caller` must be the bridge registered for `origin.network`; this is
    /// checked before the program bytes are looked at. `assets[i]` is credited
    /// to the interpreter in `amounts[i]` from the bridge's holdings before
    /// the first instruction. Interpreter creation, the credits and every
    /// instruction form one atomic unit.
    pub fn run_program(
        &mut self,
        caller: &Address,
        origin: Origin,
        program: &[u8],
        assets: &[AssetId],
        amounts: &[u128],
    ) -> Result<ExecutionResult, RouterError> {
        if self.registry.bridge(origin.network) != Some(*caller) {
            warn!(
                "Rejected program from {caller}: not the bridge for network {}",
                origin.network
            );
            return Err(RouterError::Unauthorized {
                caller: *caller,
                action: "deliver programs for this network",
            });
        }
        if assets.len() != amounts.len() {
            return Err(RouterError::MismatchedAssets {
                assets: assets.len(),
                amounts: amounts.len(),
            });
        }

        let program = codec::decode(program)?;
        for asset in assets {
            self.token(*asset)?;
        }
        let incoming: Vec<(AssetId, u128)> =
            assets.iter().copied().zip(amounts.iter().copied()).collect();

        let existing = self.interpreters.get(&origin).cloned();
        let created = existing.is_none();
        let interpreter = existing.unwrap_or_else(|| Interpreter::new(origin));

        let ctx = ExecContext {
            network: self.config.network_id,
            relayer: *caller,
            escrow: self.escrow,
            unit_scale: self.config.unit_scale,
            host: &self.registry,
        };
        let (result, writes) = {
            let mut overlay = OverlayState::new(&self.state);
            if created {
                owners::init(&mut overlay, &interpreter.address(), origin.account);
            }
            let result = interpreter
                .execute(&mut overlay, &ctx, &program, &incoming)
                .inspect_err(|e| warn!("Program for {origin} failed: {e}"))?;
            (result, overlay.into_writes())
        };
        self.state.apply_batch(writes);

        if created {
            self.record_created(interpreter);
        }
        let hash = program.hash();
        info!(
            "Executed program {hash} for {origin}: instructions={} spawns={}",
            program.instructions.len(),
            result.spawns.len()
        );
        self.events.push(RouterEvent::ProgramExecuted {
            origin,
            program: hash,
        });
        for spawn in &result.spawns {
            info!(
                "Spawn from {} to network {} escrowed {:?} of {:?}",
                spawn.origin, spawn.target_network, spawn.amounts, spawn.assets
            );
            self.events.push(RouterEvent::Spawn(spawn.clone()));
        }
        Ok(result)
    }

    /// Direct owner management from outside a program.
    ///
    /// Owner sets change only through a Call that binds the interpreter's own
    /// address into the callee slot, which runs inside `run_program`. Every
    /// direct invocation is rejected, whoever the caller claims to be.
    pub fn add_owners(
        &mut self,
        caller: &Address,
        origin: &Origin,
        _added: Vec<Address>,
    ) -> Result<(), RouterError> {
        self.reject_owner_management(caller, origin)
    }

    /// See [`Router::add_owners`].
    pub fn remove_owners(
        &mut self,
        caller: &Address,
        origin: &Origin,
        _removed: Vec<Address>,
    ) -> Result<(), RouterError> {
        self.reject_owner_management(caller, origin)
    }

    fn reject_owner_management(
        &self,
        caller: &Address,
        origin: &Origin,
    ) -> Result<(), RouterError> {
        warn!(
            "Rejected direct owner management of {} by {caller}",
            origin.interpreter_address()
        );
        Err(RouterError::Unauthorized {
            caller: *caller,
            action: "manage owners",
        })
    }

    fn token(&self, asset: AssetId) -> Result<Address, RouterError> {
        self.registry
            .asset_handle(asset)
            .ok_or(RouterError::UnknownAsset(asset))
    }

    /// Address of the interpreter for `origin`, if one has been created.
    pub fn interpreter_address(&self, origin: &Origin) -> Option<Address> {
        self.interpreters.get(origin).map(Interpreter::address)
    }

    pub fn owners(&self, origin: &Origin) -> Result<BTreeSet<Address>, RouterError> {
        Ok(owners::load(&self.state, &origin.interpreter_address())?)
    }

    /// Ledger balance of `holder` in `asset`.
    pub fn balance(&self, holder: &Address, asset: AssetId) -> Result<u128, RouterError> {
        let token = self.token(asset)?;
        Ok(self
            .state
            .balance_of(&token, holder)
            .map_err(ExecutionError::from)?)
    }

    pub fn bridge(&self, network: NetworkId) -> Option<Address> {
        self.registry.bridge(network)
    }

    pub fn asset_handle(&self, asset: AssetId) -> Option<Address> {
        self.registry.asset_handle(asset)
    }

    pub fn escrow_address(&self) -> Address {
        self.escrow
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.events)
    }
}
