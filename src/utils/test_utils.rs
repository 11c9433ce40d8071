//! Test utilities for interpreter and router testing.

#[cfg(test)]
pub mod utils {
    use crate::interpreter::host::{Contract, Host};
    use crate::program::AssetId;
    use crate::types::address::{ADDRESS_SIZE, Address};
    use crate::types::bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(1);

    /// Returns an address no other call in this test run will return.
    pub fn random_address() -> Address {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0xEEu8; ADDRESS_SIZE];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Address(bytes)
    }

    /// Builds a Call payload: the callee address followed by calldata.
    pub fn call_payload(callee: Address, calldata: &[u8]) -> Bytes {
        let mut payload = callee.0.to_vec();
        payload.extend_from_slice(calldata);
        Bytes::from_vec(payload)
    }

    /// In-memory [`Host`] with explicit asset and contract tables.
    #[derive(Default)]
    pub struct TestHost {
        assets: HashMap<AssetId, Address>,
        contracts: HashMap<Address, Box<dyn Contract>>,
    }

    impl TestHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_asset(mut self, asset: AssetId, token: Address) -> Self {
            self.assets.insert(asset, token);
            self
        }

        pub fn with_contract(mut self, address: Address, contract: impl Contract + 'static) -> Self {
            self.contracts.insert(address, Box::new(contract));
            self
        }
    }

    impl Host for TestHost {
        fn asset_handle(&self, asset: AssetId) -> Option<Address> {
            self.assets.get(&asset).copied()
        }

        fn is_token(&self, address: &Address) -> bool {
            self.assets.values().any(|token| token == address)
        }

        fn contract(&self, address: &Address) -> Option<&dyn Contract> {
            self.contracts.get(address).map(|c| c.as_ref())
        }
    }
}
