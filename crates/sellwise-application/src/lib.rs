pub mod adapter;
pub mod agents;
pub mod credentials;
pub mod polling;
pub mod service;

pub use adapter::{
    AdapterState, InvocationObserver, MediaStage, TaskAdapter, TaskDefinition, TaskResult,
};
pub use agents::TaskKind;
pub use credentials::{CredentialResolver, SecretServiceResolver, StaticCredential};
pub use polling::{PollPolicy, Sleeper, TokioSleeper, poll_operation};
pub use service::MarketplaceAgentService;
