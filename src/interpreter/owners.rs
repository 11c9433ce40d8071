//! The owner set of an interpreter.
//!
//! Stored under `SHA3("OWNERS" || interpreter)` as a sorted, encoded address
//! list. Only the interpreter itself may change it, which in practice means a
//! Call that addresses the interpreter through a self binding.

use crate::interpreter::errors::ExecutionError;
use crate::state::State;
use crate::types::address::Address;
use crate::types::encoding::{Decode, Encode};
use crate::types::hash::Hash;
use std::collections::BTreeSet;
use xcvm_derive::BinaryCodec;

/// Calldata accepted by an interpreter's management entry point.
#[derive(Clone, Debug, PartialEq, Eq, BinaryCodec)]
pub enum OwnerCall {
    AddOwners(Vec<Address>),
    RemoveOwners(Vec<Address>),
}

pub fn owners_key(interpreter: &Address) -> Hash {
    Hash::sha3()
        .chain(b"OWNERS")
        .chain(interpreter.as_slice())
        .finalize()
}

pub fn load(state: &dyn State, interpreter: &Address) -> Result<BTreeSet<Address>, ExecutionError> {
    let key = owners_key(interpreter);
    match state.get(key) {
        None => Ok(BTreeSet::new()),
        Some(raw) => Vec::<Address>::from_bytes(&raw)
            .map(|owners| owners.into_iter().collect())
            .map_err(|_| ExecutionError::CorruptState(key)),
    }
}

fn store(state: &mut dyn State, interpreter: &Address, owners: &BTreeSet<Address>) {
    let list: Vec<Address> = owners.iter().copied().collect();
    state.push(owners_key(interpreter), list.encode_to_vec());
}

/// Seeds the owner set of a freshly created interpreter.
pub fn init(state: &mut dyn State, interpreter: &Address, owner: Address) {
    store(state, interpreter, &BTreeSet::from([owner]));
}

/// Applies an owner call made by `caller` on `interpreter`.
///
/// Adding a present owner or removing an absent one changes nothing.
pub fn apply(
    state: &mut dyn State,
    caller: &Address,
    interpreter: &Address,
    call: &OwnerCall,
) -> Result<(), ExecutionError> {
    if caller != interpreter {
        return Err(ExecutionError::Unauthorized {
            caller: *caller,
            interpreter: *interpreter,
        });
    }

    let mut owners = load(state, interpreter)?;
    match call {
        OwnerCall::AddOwners(added) => owners.extend(added.iter().copied()),
        OwnerCall::RemoveOwners(removed) => {
            for owner in removed {
                owners.remove(owner);
            }
        }
    }
    store(state, interpreter, &owners);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryState;

    const INTERPRETER: Address = Address([0x11; 20]);
    const OWNER: Address = Address([0x22; 20]);
    const X: Address = Address([0x33; 20]);

    fn seeded() -> MemoryState {
        let mut state = MemoryState::new();
        init(&mut state, &INTERPRETER, OWNER);
        state
    }

    #[test]
    fn starts_with_deploying_account() {
        let state = seeded();
        assert_eq!(load(&state, &INTERPRETER).unwrap(), BTreeSet::from([OWNER]));
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut state = seeded();
        let add = OwnerCall::AddOwners(vec![X]);
        apply(&mut state, &INTERPRETER, &INTERPRETER, &add).unwrap();
        apply(&mut state, &INTERPRETER, &INTERPRETER, &add).unwrap();
        assert_eq!(load(&state, &INTERPRETER).unwrap(), BTreeSet::from([OWNER, X]));

        let remove = OwnerCall::RemoveOwners(vec![X]);
        apply(&mut state, &INTERPRETER, &INTERPRETER, &remove).unwrap();
        apply(&mut state, &INTERPRETER, &INTERPRETER, &remove).unwrap();
        assert_eq!(load(&state, &INTERPRETER).unwrap(), BTreeSet::from([OWNER]));
    }

    #[test]
    fn other_callers_are_rejected() {
        let mut state = seeded();
        assert_eq!(
            apply(&mut state, &OWNER, &INTERPRETER, &OwnerCall::AddOwners(vec![X])),
            Err(ExecutionError::Unauthorized {
                caller: OWNER,
                interpreter: INTERPRETER
            })
        );
        assert!(!load(&state, &INTERPRETER).unwrap().contains(&X));
    }

    #[test]
    fn stored_list_is_sorted() {
        let mut state = MemoryState::new();
        init(&mut state, &INTERPRETER, X);
        apply(
            &mut state,
            &INTERPRETER,
            &INTERPRETER,
            &OwnerCall::AddOwners(vec![OWNER]),
        )
        .unwrap();
        let raw = state.get(owners_key(&INTERPRETER)).unwrap();
        assert_eq!(Vec::<Address>::from_bytes(&raw).unwrap(), vec![OWNER, X]);
    }
}
