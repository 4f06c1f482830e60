//! Commands and fetchers generated for a contract kind.
//!
//! `ContractKind::new("Erc20", "StandardToken")` gives
//!
//! * `Erc20 Deploy <name> <args...>` deploys the artifact and registers it
//! * `Erc20 <name> <Method> <args...>` sends a transaction
//! * `(Erc20 <name> Address)` is the address, or `Nothing` if not deployed
//! * `(Erc20 <name> <Method> <args...>)` is a read call

use crate::chain::ContractHandle;
use crate::command::{Arg, Args, Command, CommandTable, Fetcher, FetcherTable};
use crate::errors::{Result, ScenarioError};
use crate::resolver::getters::{get_from, get_values, get_word};
use crate::values::{Value, Wire};
use crate::world::{ContractRecord, Invocation, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractKind {
    kind: String,
    artifact: String,
}

impl ContractKind {
    pub fn new(kind: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            artifact: artifact.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn command(&self) -> Command {
        let deploy = {
            let this = self.clone();
            Command::new(
                "Deploy",
                format!("Deploy a new {} from `{}`", self.kind, self.artifact),
                move |ctx, world, args| {
                    let this = this.clone();
                    Box::pin(async move {
                        let name = args.string("name")?;
                        let from = args.address("from")?;
                        let wires = encode_all(&args)?;
                        let receipt = ctx
                            .chain()
                            .deploy(&this.artifact, wires, from, world.tx_options())
                            .await?;

                        let created = receipt.created.clone();
                        let description = format!("Deployed {} {} ({})", this.kind, name, this.artifact);
                        let world = Invocation::new(description, from.clone(), receipt).record(world);
                        Ok(match created {
                            Some(address) => world.register_contract(
                                &this.kind,
                                name,
                                ContractRecord::new(address, this.artifact.clone()),
                            ),
                            None => world,
                        })
                    })
                },
            )
            .arg(Arg::new("name", get_word))
            .arg(Arg::new("args", get_values).variadic())
            .arg(Arg::new("from", get_from).implicit())
        };

        let send = {
            let this = self.clone();
            Command::new(
                "Send",
                format!("Send a transaction to a {}", self.kind),
                move |ctx, world, args| {
                    let this = this.clone();
                    Box::pin(async move {
                        let name = args.string("contract")?;
                        let method = contract_method(args.string("method")?);
                        let from = args.address("from")?;
                        let handle = this.handle(&world, name)?;
                        let wires = encode_all(&args)?;
                        let description = format!(
                            "{} {}: {}({})",
                            this.kind,
                            name,
                            method,
                            show_all(&args)?
                        );
                        let receipt = ctx
                            .chain()
                            .send_tx(&handle, &method, wires, from, world.tx_options())
                            .await?;
                        Ok(Invocation::new(description, from.clone(), receipt).record(world))
                    })
                },
            )
            .catchall()
            .arg(Arg::new("contract", get_word))
            .arg(Arg::new("method", get_word))
            .arg(Arg::new("args", get_values).variadic())
            .arg(Arg::new("from", get_from).implicit())
        };

        Command::sub(
            self.kind.clone(),
            format!("{} contracts deployed from `{}`", self.kind, self.artifact),
            CommandTable::new().with(deploy).with(send),
        )
    }

    pub fn fetcher(&self) -> Fetcher {
        let address = {
            let kind = self.kind.clone();
            Fetcher::new(
                "Address",
                format!("Address of a {}, or Nothing", self.kind),
                move |_, world, args| {
                    let found = args.string("contract").map(|name| {
                        world
                            .contract(&kind, name)
                            .map_or(Value::Nothing, |record| Value::Address(record.address.clone()))
                    });
                    Box::pin(core::future::ready(found))
                },
            )
            .name_pos(1)
            .arg(Arg::new("contract", get_word))
        };

        let call = {
            let this = self.clone();
            Fetcher::new(
                "Call",
                format!("Read from a {}", self.kind),
                move |ctx, world, args| {
                    let this = this.clone();
                    Box::pin(async move {
                        let name = args.string("contract")?;
                        let method = contract_method(args.string("method")?);
                        let handle = this.handle(world, name)?;
                        let result = ctx.chain().call_read(&handle, &method, encode_all(&args)?).await?;
                        Ok(Value::from_wire(result))
                    })
                },
            )
            .catchall()
            .arg(Arg::new("contract", get_word))
            .arg(Arg::new("method", get_word))
            .arg(Arg::new("args", get_values).variadic())
        };

        Fetcher::sub(
            self.kind.clone(),
            format!("Reads from {} contracts", self.kind),
            FetcherTable::new().with(address).with(call),
        )
    }

    fn handle(&self, world: &World, name: &str) -> Result<ContractHandle> {
        let record = world.contract(&self.kind, name).ok_or_else(|| {
            ScenarioError::resolution(name, format!("no {} named `{}` is deployed", self.kind, name))
        })?;
        Ok(ContractHandle {
            address: record.address.clone(),
            artifact: record.contract.clone(),
        })
    }
}

/// Script method names are capitalised; contract methods are camel case.
pub fn contract_method(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            format!("{}{}", first.to_ascii_lowercase(), chars.as_str())
        }
        _ => name.to_string(),
    }
}

fn encode_all(args: &Args) -> Result<Vec<Wire>> {
    args.list("args")?
        .iter()
        .map(|value| value.encode().map_err(ScenarioError::from))
        .collect()
}

fn show_all(args: &Args) -> Result<String> {
    let shown: Vec<String> = args.list("args")?.iter().map(Value::show).collect();
    Ok(shown.join(", "))
}
