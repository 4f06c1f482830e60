#![allow(dead_code)]

use std::sync::Arc;

use num_bigint::BigInt;
use scenario::chain::{CallEnv, ChainError, ContractLogic, ContractState, Effect, MemoryChain, wire_key};
use scenario::chain::LogEntry;
use scenario::events::ContractKind;
use scenario::values::Wire;
use scenario::{BufferPrinter, Interpreter, World};

/// Minimal fungible token used by the `Erc20` and `OToken` kinds.
///
/// * constructor `[supply]` mints to the deployer
/// * `mint amount`, `burn amount`, `transfer to amount`
/// * reads `totalSupply`, `balanceOf owner`
pub struct StandardToken;

pub const TOKEN_ARTIFACT: &str = "StandardToken";

fn int_arg(method: &str, args: &[Wire], index: usize) -> Result<BigInt, ChainError> {
    args.get(index)
        .and_then(Wire::as_int)
        .cloned()
        .ok_or_else(|| ChainError::BadArguments {
            method: method.to_string(),
            reason: format!("argument {} must be an integer", index),
        })
}

fn balance_key(owner: &str) -> String {
    format!("balance:{}", owner)
}

fn credit(state: &mut ContractState, owner: &str, amount: &BigInt) {
    let key = balance_key(owner);
    let balance = state.get_int(&key) + amount;
    state.set(key, Wire::Int(balance));
}

impl ContractLogic for StandardToken {
    fn construct(
        &self,
        state: &mut ContractState,
        env: &CallEnv,
        args: &[Wire],
    ) -> Result<Effect, ChainError> {
        if !args.is_empty() {
            let supply = int_arg("constructor", args, 0)?;
            credit(state, env.sender.as_str(), &supply);
            state.set("totalSupply", Wire::Int(supply));
        }
        Ok(Effect::Logs(Vec::new()))
    }

    fn read(&self, state: &ContractState, method: &str, args: &[Wire]) -> Result<Wire, ChainError> {
        match method {
            "totalSupply" => Ok(Wire::Int(state.get_int("totalSupply"))),
            "balanceOf" => {
                let owner = args.first().map(wire_key).ok_or_else(|| ChainError::BadArguments {
                    method: method.to_string(),
                    reason: "missing owner".to_string(),
                })?;
                Ok(Wire::Int(state.get_int(&balance_key(&owner))))
            }
            _ => Err(ChainError::UnknownMethod {
                artifact: TOKEN_ARTIFACT.to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn write(
        &self,
        state: &mut ContractState,
        env: &CallEnv,
        method: &str,
        args: &[Wire],
    ) -> Result<Effect, ChainError> {
        match method {
            "mint" => {
                let amount = int_arg(method, args, 0)?;
                credit(state, env.sender.as_str(), &amount);
                let supply = state.get_int("totalSupply") + &amount;
                state.set("totalSupply", Wire::Int(supply));
                Ok(Effect::Logs(vec![
                    LogEntry::new("Mint")
                        .field("minter", Wire::Address(env.sender.clone()))
                        .field("amount", Wire::Int(amount)),
                ]))
            }
            "burn" => {
                let amount = int_arg(method, args, 0)?;
                let balance = state.get_int(&balance_key(env.sender.as_str()));
                if balance < amount {
                    return Ok(Effect::Revert("burn amount exceeds balance".to_string()));
                }
                credit(state, env.sender.as_str(), &-amount.clone());
                let supply = state.get_int("totalSupply") - &amount;
                state.set("totalSupply", Wire::Int(supply));
                Ok(Effect::Logs(Vec::new()))
            }
            "transfer" => {
                let to = args.first().map(wire_key).ok_or_else(|| ChainError::BadArguments {
                    method: method.to_string(),
                    reason: "missing recipient".to_string(),
                })?;
                let amount = int_arg(method, args, 1)?;
                let balance = state.get_int(&balance_key(env.sender.as_str()));
                if balance < amount {
                    return Ok(Effect::Failure {
                        error: "TOKEN_INSUFFICIENT_BALANCE".to_string(),
                        info: "TRANSFER".to_string(),
                        detail: "0".to_string(),
                    });
                }
                credit(state, env.sender.as_str(), &-amount.clone());
                credit(state, &to, &amount);
                Ok(Effect::Logs(vec![
                    LogEntry::new("Transfer")
                        .field("from", Wire::Address(env.sender.clone()))
                        .field("amount", Wire::Int(amount)),
                ]))
            }
            _ => Err(ChainError::UnknownMethod {
                artifact: TOKEN_ARTIFACT.to_string(),
                method: method.to_string(),
            }),
        }
    }
}

/// Interpreter with `Erc20`, `OToken` and `Box` kinds over a fresh chain.
pub fn interpreter() -> (Interpreter, Arc<BufferPrinter>) {
    let printer = Arc::new(BufferPrinter::new());
    let chain = MemoryChain::new().with_logic(TOKEN_ARTIFACT, StandardToken);
    let interpreter = Interpreter::builder(Arc::new(chain))
        .printer(printer.clone())
        .contract_kind(ContractKind::new("Erc20", TOKEN_ARTIFACT))
        .contract_kind(ContractKind::new("OToken", TOKEN_ARTIFACT))
        .contract_kind(ContractKind::new("Box", "Storage"))
        .build();
    (interpreter, printer)
}

pub async fn world(interpreter: &Interpreter) -> World {
    interpreter.initial_world().await.unwrap()
}
