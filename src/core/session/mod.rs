// Session module - Session capabilities and the keyed registry
pub mod registry;
pub mod session;

pub use registry::{RegistryOptions, SessionFactory, SessionRegistry};
pub use session::{Destroyable, Mutable, Runnable, Seek, Session, Snapshot};
