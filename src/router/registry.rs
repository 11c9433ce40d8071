//! Bridge, asset and contract tables of a router.
//!
//! Entries are only ever added. Asset mappings are first-come: once an asset id
//! or a ledger handle is taken it cannot be pointed elsewhere.

use crate::interpreter::{Contract, Host};
use crate::program::{AssetId, NetworkId};
use crate::router::errors::RouterError;
use crate::types::address::Address;
use std::collections::HashMap;

#[derive(Default)]
pub struct Registry {
    bridges: HashMap<NetworkId, Address>,
    assets: HashMap<AssetId, Address>,
    handles: HashMap<Address, AssetId>,
    contracts: HashMap<Address, Box<dyn Contract>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `network` to `bridge`, returning the bridge it replaces.
    pub fn register_bridge(&mut self, network: NetworkId, bridge: Address) -> Option<Address> {
        self.bridges.insert(network, bridge)
    }

    pub fn bridge(&self, network: NetworkId) -> Option<Address> {
        self.bridges.get(&network).copied()
    }

    pub fn register_asset(&mut self, handle: Address, asset: AssetId) -> Result<(), RouterError> {
        if self.assets.contains_key(&asset) || self.handles.contains_key(&handle) {
            return Err(RouterError::AssetAlreadyRegistered { asset, handle });
        }
        if self.contracts.contains_key(&handle) {
            return Err(RouterError::ContractAlreadyRegistered(handle));
        }
        self.assets.insert(asset, handle);
        self.handles.insert(handle, asset);
        Ok(())
    }

    pub fn asset_id(&self, handle: &Address) -> Option<AssetId> {
        self.handles.get(handle).copied()
    }

    pub fn register_contract(
        &mut self,
        address: Address,
        contract: Box<dyn Contract>,
    ) -> Result<(), RouterError> {
        if self.contracts.contains_key(&address) || self.handles.contains_key(&address) {
            return Err(RouterError::ContractAlreadyRegistered(address));
        }
        self.contracts.insert(address, contract);
        Ok(())
    }
}

impl Host for Registry {
    fn asset_handle(&self, asset: AssetId) -> Option<Address> {
        self.assets.get(&asset).copied()
    }

    fn is_token(&self, address: &Address) -> bool {
        self.handles.contains_key(address)
    }

    fn contract(&self, address: &Address) -> Option<&dyn Contract> {
        self.contracts.get(address).map(|contract| contract.as_ref())
    }
}
