use crate::program::NetworkId;
use crate::router::errors::RouterError;
use crate::types::address::Address;

/// Smallest-denomination multiplier used when none is configured.
pub const DEFAULT_UNIT_SCALE: u128 = 1_000_000_000_000_000_000;

/// Deployment parameters of a router, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterConfig {
    /// Network this router executes programs on.
    pub network_id: NetworkId,
    /// Only identity allowed to register bridges, assets and contracts.
    pub admin: Address,
    /// Multiplier for the integer part of `Balance::Unit`.
    pub unit_scale: u128,
}

impl RouterConfig {
    pub fn new(network_id: NetworkId, admin: Address) -> Self {
        Self {
            network_id,
            admin,
            unit_scale: DEFAULT_UNIT_SCALE,
        }
    }

    pub fn with_unit_scale(mut self, unit_scale: u128) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    pub fn validate(&self) -> Result<(), RouterError> {
        if self.unit_scale == 0 {
            return Err(RouterError::InvalidConfig("unit scale must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_is_eighteen_decimals() {
        let config = RouterConfig::new(NetworkId(1), Address::zero());
        assert_eq!(config.unit_scale, 10u128.pow(18));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_scale_is_rejected() {
        let config = RouterConfig::new(NetworkId(1), Address::zero()).with_unit_scale(0);
        assert!(matches!(config.validate(), Err(RouterError::InvalidConfig(_))));
    }
}
