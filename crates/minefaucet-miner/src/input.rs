//! Line commands typed at the `mine` prompt.

use std::str::FromStr;

use minefaucet_core::Address;

pub const HELP: &str = "commands: start | claim | refresh | connect [0x…] | disconnect | help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Start,
    Claim,
    Refresh,
    /// Connect the configured wallet, or switch to the given address.
    Connect(Option<Address>),
    Disconnect,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments; {HELP}"));
        }

        let input = match (verb.as_str(), arg) {
            ("start" | "s", None) => Input::Start,
            ("claim" | "c", None) => Input::Claim,
            ("refresh" | "r", None) => Input::Refresh,
            ("connect", None) => Input::Connect(None),
            ("connect", Some(a)) => {
                Input::Connect(Some(a.parse().map_err(|e| format!("{e}"))?))
            }
            ("disconnect", None) => Input::Disconnect,
            ("help" | "?", None) => Input::Help,
            ("quit" | "q" | "exit", None) => Input::Quit,
            ("", None) => return Err(HELP.to_string()),
            (other, _) => return Err(format!("unknown command {other:?}; {HELP}")),
        };
        Ok(input)
    }
}
