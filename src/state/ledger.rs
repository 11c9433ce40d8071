//! Token balances kept in a [`State`] store.
//!
//! A token is identified by its ledger handle, the address under which it was
//! registered with a router. Balances are `u128` values stored under
//! `SHA3("BALANCE" || handle || holder)`; an absent key is a zero balance.

use crate::state::state::State;
use crate::types::address::Address;
use crate::types::encoding::{Decode, Encode};
use crate::types::hash::Hash;
use xcvm_derive::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{holder} holds {available} of token {token}, {required} required")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        required: u128,
        available: u128,
    },
    #[error("balance of {holder} in token {token} would overflow")]
    Overflow { token: Address, holder: Address },
    #[error("corrupt balance entry {0}")]
    CorruptEntry(Hash),
}

/// Storage key of `holder`'s balance in `token`.
pub fn balance_key(token: &Address, holder: &Address) -> Hash {
    Hash::sha3()
        .chain(b"BALANCE")
        .chain(token.as_slice())
        .chain(holder.as_slice())
        .finalize()
}

/// Credit/debit interface over token balances.
pub trait Ledger {
    fn balance_of(&self, token: &Address, holder: &Address) -> Result<u128, LedgerError>;

    fn credit(&mut self, token: &Address, holder: &Address, amount: u128)
    -> Result<(), LedgerError>;

    /// Fails with `InsufficientBalance` when `amount` exceeds the holding.
    fn debit(&mut self, token: &Address, holder: &Address, amount: u128)
    -> Result<(), LedgerError>;

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }
}

fn store_balance<S: State + ?Sized>(state: &mut S, key: Hash, amount: u128) {
    if amount == 0 {
        state.delete(key);
    } else {
        state.push(key, amount.encode_to_vec());
    }
}

impl<S: State + ?Sized> Ledger for S {
    fn balance_of(&self, token: &Address, holder: &Address) -> Result<u128, LedgerError> {
        let key = balance_key(token, holder);
        match self.get(key) {
            None => Ok(0),
            Some(raw) => u128::from_bytes(&raw).map_err(|_| LedgerError::CorruptEntry(key)),
        }
    }

    fn credit(
        &mut self,
        token: &Address,
        holder: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let current = self.balance_of(token, holder)?;
        let updated = current.checked_add(amount).ok_or(LedgerError::Overflow {
            token: *token,
            holder: *holder,
        })?;
        store_balance(self, balance_key(token, holder), updated);
        Ok(())
    }

    fn debit(
        &mut self,
        token: &Address,
        holder: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, holder)?;
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                token: *token,
                holder: *holder,
                required: amount,
                available,
            });
        }
        store_balance(self, balance_key(token, holder), available - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::state::{MemoryState, OverlayState};

    const TOKEN: Address = Address([0xAA; 20]);
    const ALICE: Address = Address([1; 20]);
    const BOB: Address = Address([2; 20]);

    #[test]
    fn absent_balance_is_zero() {
        let state = MemoryState::new();
        assert_eq!(state.balance_of(&TOKEN, &ALICE), Ok(0));
    }

    #[test]
    fn credit_then_debit() {
        let mut state = MemoryState::new();
        state.credit(&TOKEN, &ALICE, 100).unwrap();
        state.debit(&TOKEN, &ALICE, 40).unwrap();
        assert_eq!(state.balance_of(&TOKEN, &ALICE), Ok(60));
    }

    #[test]
    fn debit_beyond_balance_fails_without_change() {
        let mut state = MemoryState::new();
        state.credit(&TOKEN, &ALICE, 10).unwrap();
        assert_eq!(
            state.debit(&TOKEN, &ALICE, 11),
            Err(LedgerError::InsufficientBalance {
                token: TOKEN,
                holder: ALICE,
                required: 11,
                available: 10
            })
        );
        assert_eq!(state.balance_of(&TOKEN, &ALICE), Ok(10));
    }

    #[test]
    fn zero_balance_removes_entry() {
        let mut state = MemoryState::new();
        state.credit(&TOKEN, &ALICE, 5).unwrap();
        state.debit(&TOKEN, &ALICE, 5).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn credit_overflow() {
        let mut state = MemoryState::new();
        state.credit(&TOKEN, &ALICE, u128::MAX).unwrap();
        assert_eq!(
            state.credit(&TOKEN, &ALICE, 1),
            Err(LedgerError::Overflow {
                token: TOKEN,
                holder: ALICE
            })
        );
    }

    #[test]
    fn transfer_through_overlay_is_discarded_unless_applied() {
        let mut base = MemoryState::new();
        base.credit(&TOKEN, &ALICE, 50).unwrap();
        {
            let mut overlay = OverlayState::new(&base);
            overlay.transfer(&TOKEN, &ALICE, &BOB, 20).unwrap();
            assert_eq!(overlay.balance_of(&TOKEN, &BOB), Ok(20));
        }
        assert_eq!(base.balance_of(&TOKEN, &BOB), Ok(0));
        assert_eq!(base.balance_of(&TOKEN, &ALICE), Ok(50));
    }

    #[test]
    fn balances_are_per_token() {
        let mut state = MemoryState::new();
        state.credit(&TOKEN, &ALICE, 5).unwrap();
        assert_eq!(state.balance_of(&Address([0xBB; 20]), &ALICE), Ok(0));
    }
}
