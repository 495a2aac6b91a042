pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod secret;
pub mod shape;
pub mod store;
pub mod task;
pub mod template;

// Re-export the types most callers need
pub use error::{FailureKind, SellwiseError, TaskError};
pub use media::DataUri;
pub use model::{Capability, Credential, GenerativeModel};
pub use shape::{FieldShape, Shape};
pub use task::{InputField, InputKind, TaskInput, TaskSpec};
pub use template::PromptTemplate;
