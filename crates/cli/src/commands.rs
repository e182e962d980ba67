//! Command line arguments

use alloy_primitives::Address;

pub const USAGE: &str = "\
Usage:
  metamoney [watch]                  refresh and log markets until Ctrl+C
  metamoney deposit <token> <amount> deposit into the money market
  metamoney withdraw <token> <amount> withdraw from the money market
  metamoney approve <token> <amount> let the money market spend <amount>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Watch,
    Deposit { token: Address, amount: String },
    Withdraw { token: Address, amount: String },
    Approve { token: Address, amount: String },
}

/// Parse arguments without the program name
pub fn parse(args: &[String]) -> anyhow::Result<Command> {
    let Some(name) = args.first() else {
        return Ok(Command::Watch);
    };

    match name.as_str() {
        "watch" => Ok(Command::Watch),
        "deposit" | "withdraw" | "approve" => {
            let (token, amount) = match &args[1..] {
                [token, amount] => (token, amount),
                _ => anyhow::bail!("{} takes <token> <amount>\n{}", name, USAGE),
            };
            let token: Address = token
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid token address {}: {}", token, e))?;
            let amount = amount.clone();

            Ok(match name.as_str() {
                "deposit" => Command::Deposit { token, amount },
                "withdraw" => Command::Withdraw { token, amount },
                _ => Command::Approve { token, amount },
            })
        }
        other => anyhow::bail!("unknown command {}\n{}", other, USAGE),
    }
}
