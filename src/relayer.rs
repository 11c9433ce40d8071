//! In-process relayer carrying Spawn records between routers.
//!
//! The relayer is the bridge of the origin network on every router it
//! delivers to. Each record is delivered at most once per dispatch key; a
//! delivery that fails frees its key so the record can be retried.

use crate::interpreter::{ExecutionResult, SpawnRecord};
use crate::program::NetworkId;
use crate::router::{Router, RouterError};
use crate::types::address::Address;
use crate::types::hash::Hash;
use crate::{debug, error, info, warn};
use dashmap::DashSet;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::Receiver;

/// A router shared between tasks. The mutex serializes calls into it.
pub type SharedRouter = Arc<Mutex<Router>>;

/// Counters returned by [`Relayer::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: usize,
    pub duplicates: usize,
    pub failed: usize,
}

pub struct Relayer {
    bridge: Address,
    routers: HashMap<NetworkId, SharedRouter>,
    delivered: DashSet<Hash>,
}

impl Relayer {
    pub fn new(bridge: Address) -> Self {
        Self {
            bridge,
            routers: HashMap::new(),
            delivered: DashSet::new(),
        }
    }

    pub fn bridge(&self) -> Address {
        self.bridge
    }

    /// Makes `router` the delivery target for records addressed to `network`.
    pub fn connect(&mut self, network: NetworkId, router: SharedRouter) {
        info!("Relayer {} connected to network {network}", self.bridge);
        self.routers.insert(network, router);
    }

    pub fn is_delivered(&self, record: &SpawnRecord) -> bool {
        self.delivered.contains(&record.dispatch_key())
    }

    /// Delivers `record` to the router of its target network.
    ///
    /// Returns `Ok(None)` when a record with the same dispatch key was
    /// already delivered.
    pub async fn relay(
        &self,
        record: &SpawnRecord,
    ) -> Result<Option<ExecutionResult>, RouterError> {
        let key = record.dispatch_key();
        if !self.delivered.insert(key) {
            info!(
                "Skipping duplicate spawn {key} from {} to network {}",
                record.origin, record.target_network
            );
            return Ok(None);
        }

        let Some(router) = self.routers.get(&record.target_network) else {
            self.delivered.remove(&key);
            return Err(RouterError::UnknownNetwork(record.target_network));
        };

        let outcome = router.lock().await.run_program(
            &self.bridge,
            record.origin,
            &record.program,
            &record.assets,
            &record.amounts,
        );
        match outcome {
            Ok(result) => {
                info!(
                    "Delivered spawn {key} from {} to network {}",
                    record.origin, record.target_network
                );
                Ok(Some(result))
            }
            Err(e) => {
                self.delivered.remove(&key);
                warn!("Delivery of spawn {key} failed: {e}");
                Err(e)
            }
        }
    }

    /// Relays records from `rx` until the channel closes.
    ///
    /// Spawns produced by a delivery are relayed before the next record is
    /// taken from the channel.
    pub async fn run(&self, mut rx: Receiver<SpawnRecord>) -> RelayStats {
        let mut stats = RelayStats::default();
        let mut pending = VecDeque::new();

        while let Some(record) = rx.recv().await {
            pending.push_back(record);
            while let Some(record) = pending.pop_front() {
                match self.relay(&record).await {
                    Ok(Some(result)) => {
                        stats.delivered += 1;
                        debug!("{} follow-up spawns queued", result.spawns.len());
                        pending.extend(result.spawns);
                    }
                    Ok(None) => stats.duplicates += 1,
                    Err(e) => {
                        stats.failed += 1;
                        error!(
                            "Dropping spawn from {} to network {}: {e}",
                            record.origin, record.target_network
                        );
                    }
                }
            }
        }

        info!(
            "Relayer stopped: delivered={} duplicates={} failed={}",
            stats.delivered, stats.duplicates, stats.failed
        );
        stats
    }
}
