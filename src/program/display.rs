//! Human-readable listing of programs, used by the CLI and in logs.

use crate::program::asset::Asset;
use crate::program::instruction::{Destination, Instruction, Program};
use std::fmt;

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Account(address) => write!(f, "{address}"),
            Destination::Relayer => write!(f, "relayer"),
            Destination::Interpreter => write!(f, "self"),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.asset_id, self.balance)
    }
}

impl Program {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        writeln!(f, "{pad}program tag={}", self.tag)?;
        for (i, instruction) in self.instructions.iter().enumerate() {
            write!(f, "{pad}  {i:>3}: ")?;
            match instruction {
                Instruction::Transfer {
                    destination,
                    assets,
                } => {
                    writeln!(f, "transfer to {destination}")?;
                    write_assets(f, assets, &pad)?;
                }
                Instruction::Call { payload, bindings } => {
                    writeln!(f, "call payload={payload}")?;
                    for binding in bindings {
                        writeln!(f, "{pad}       @{} <- {}", binding.position, binding.value)?;
                    }
                }
                Instruction::Spawn {
                    network,
                    salt,
                    version,
                    program,
                    assets,
                } => {
                    writeln!(f, "spawn network={network} salt={salt} version={version}")?;
                    write_assets(f, assets, &pad)?;
                    program.write_indented(f, indent + 3)?;
                }
            }
        }
        Ok(())
    }
}

fn write_assets(f: &mut fmt::Formatter<'_>, assets: &[Asset], pad: &str) -> fmt::Result {
    for asset in assets {
        writeln!(f, "{pad}       {asset}")?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
