mod executor;
pub mod fsm;
pub mod types;

pub use executor::{Relay, RelayOutcome};
pub use fsm::{RelayEvent, RelayState, RelayStateMachine};
pub use types::InboundRequest;
