//! Per-account program execution.
//!
//! An [`Interpreter`] runs a decoded program against a [`State`] on behalf of
//! one origin. All writes go through an overlay that reaches the underlying
//! state only when every instruction succeeded.

use crate::debug;
use crate::interpreter::dispatch::{Origin, SpawnRecord};
use crate::interpreter::errors::ExecutionError;
use crate::interpreter::host::{Host, TokenCall};
use crate::interpreter::owners::{self, OwnerCall};
use crate::interpreter::resolver::{LiveValues, resolve_payload};
use crate::program::{Asset, AssetId, Binding, BindingValue, Destination, Instruction, NetworkId, Program};
use crate::state::{Ledger, OverlayState, State};
use crate::types::address::{ADDRESS_SIZE, Address};
use crate::types::bytes::Bytes;
use crate::types::encoding::Decode;

/// Deployment values an execution depends on.
pub struct ExecContext<'a> {
    /// Network the program executes on.
    pub network: NetworkId,
    /// Bridge that delivered the program; target of `Destination::Relayer`.
    pub relayer: Address,
    /// Holder of assets escrowed by Spawn.
    pub escrow: Address,
    /// Multiplier applied to the integer part of `Balance::Unit`.
    pub unit_scale: u128,
    pub host: &'a dyn Host,
}

impl ExecContext<'_> {
    fn token(&self, asset: AssetId) -> Result<Address, ExecutionError> {
        self.host
            .asset_handle(asset)
            .ok_or(ExecutionError::UnknownAsset(asset))
    }
}

/// What a successful program produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Dispatch records for the relay layer, in instruction order.
    pub spawns: Vec<SpawnRecord>,
    /// Return bytes of each Call, in instruction order.
    pub outputs: Vec<Bytes>,
}

/// Execution context of one `(network, account)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interpreter {
    origin: Origin,
    address: Address,
}

struct Live<'a> {
    state: &'a dyn State,
    ctx: &'a ExecContext<'a>,
    address: Address,
}

impl LiveValues for Live<'_> {
    fn self_address(&self) -> Address {
        self.address
    }

    fn balance(&self, asset: AssetId) -> Result<u128, ExecutionError> {
        let token = self.ctx.token(asset)?;
        Ok(self.state.balance_of(&token, &self.address)?)
    }
}

impl Interpreter {
    pub fn new(origin: Origin) -> Self {
        Self {
            address: origin.interpreter_address(),
            origin,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Moves `incoming` from the relayer into the interpreter, then runs
    /// `program`. Either everything is applied to `state` or nothing is.
    pub fn execute(
        &self,
        state: &mut dyn State,
        ctx: &ExecContext<'_>,
        program: &Program,
        incoming: &[(AssetId, u128)],
    ) -> Result<ExecutionResult, ExecutionError> {
        let (result, writes) = {
            let mut overlay = OverlayState::new(&*state);
            let result = self.run(&mut overlay, ctx, program, incoming)?;
            (result, overlay.into_writes())
        };
        state.apply_batch(writes);
        Ok(result)
    }

    fn run(
        &self,
        state: &mut dyn State,
        ctx: &ExecContext<'_>,
        program: &Program,
        incoming: &[(AssetId, u128)],
    ) -> Result<ExecutionResult, ExecutionError> {
        for (asset, amount) in incoming {
            let token = ctx.token(*asset)?;
            state.transfer(&token, &ctx.relayer, &self.address, *amount)?;
        }

        let mut result = ExecutionResult::default();
        for (index, instruction) in program.instructions.iter().enumerate() {
            debug!(
                "interpreter {} instruction {index}: {}",
                self.address,
                instruction.name()
            );
            match instruction {
                Instruction::Transfer {
                    destination,
                    assets,
                } => {
                    let to = self.resolve_destination(ctx, destination);
                    for asset in assets {
                        self.withdraw(state, ctx, asset, &to)?;
                    }
                }
                Instruction::Call { payload, bindings } => {
                    let output = self.call(state, ctx, payload, bindings)?;
                    result.outputs.push(output);
                }
                Instruction::Spawn {
                    network,
                    salt,
                    version,
                    program,
                    assets,
                } => {
                    let mut ids = Vec::with_capacity(assets.len());
                    let mut amounts = Vec::with_capacity(assets.len());
                    for asset in assets {
                        amounts.push(self.withdraw(state, ctx, asset, &ctx.escrow)?);
                        ids.push(asset.asset_id);
                    }
                    debug!(
                        "interpreter {} spawning on network {network} from {}",
                        self.address, ctx.network
                    );
                    result.spawns.push(SpawnRecord {
                        origin: self.origin,
                        target_network: *network,
                        salt: salt.clone(),
                        version: *version,
                        program: program.to_wire(),
                        assets: ids,
                        amounts,
                    });
                }
            }
        }
        Ok(result)
    }

    fn resolve_destination(&self, ctx: &ExecContext<'_>, destination: &Destination) -> Address {
        match destination {
            Destination::Account(address) => *address,
            Destination::Relayer => ctx.relayer,
            Destination::Interpreter => self.address,
        }
    }

    /// Computes the amount selected by `asset` and moves it to `to`.
    fn withdraw(
        &self,
        state: &mut dyn State,
        ctx: &ExecContext<'_>,
        asset: &Asset,
        to: &Address,
    ) -> Result<u128, ExecutionError> {
        let token = ctx.token(asset.asset_id)?;
        let available = state.balance_of(&token, &self.address)?;
        // An amount too large for u128 is necessarily more than is held.
        let amount = match asset
            .balance
            .amount(asset.asset_id, available, ctx.unit_scale)
        {
            Err(ExecutionError::AmountOverflow(_)) => u128::MAX,
            other => other?,
        };
        if amount > available {
            return Err(ExecutionError::InsufficientBalance {
                asset: asset.asset_id,
                required: amount,
                available,
            });
        }
        state.transfer(&token, &self.address, to, amount)?;
        Ok(amount)
    }

    /// Resolves bindings and dispatches on the callee in the first 20 bytes.
    fn call(
        &self,
        state: &mut dyn State,
        ctx: &ExecContext<'_>,
        payload: &Bytes,
        bindings: &[Binding],
    ) -> Result<Bytes, ExecutionError> {
        let live = Live {
            state: &*state,
            ctx,
            address: self.address,
        };
        let resolved = resolve_payload(payload, bindings, &live)?;
        let callee =
            Address::from_prefix(&resolved).ok_or(ExecutionError::MissingCallee(resolved.len()))?;
        let calldata = &resolved[ADDRESS_SIZE..];

        if callee == self.address {
            // The callee slot must be the self binding, not a literal address.
            let via_binding = bindings
                .iter()
                .any(|b| b.position == 0 && b.value == BindingValue::Interpreter);
            if !via_binding {
                return Err(ExecutionError::Unauthorized {
                    caller: self.origin.account,
                    interpreter: self.address,
                });
            }
            let call = OwnerCall::from_bytes(calldata)
                .map_err(|reason| ExecutionError::InvalidCall { callee, reason })?;
            owners::apply(state, &self.address, &self.address, &call)?;
            return Ok(Bytes::default());
        }

        if ctx.host.is_token(&callee) {
            let TokenCall::Transfer { to, amount } = TokenCall::from_bytes(calldata)
                .map_err(|reason| ExecutionError::InvalidCall { callee, reason })?;
            state.transfer(&callee, &self.address, &to, amount)?;
            return Ok(Bytes::default());
        }

        match ctx.host.contract(&callee) {
            Some(contract) => Ok(Bytes::from_vec(contract.call(
                state,
                &self.address,
                calldata,
            )?)),
            None => Err(ExecutionError::UnknownCallee(callee)),
        }
    }
}
