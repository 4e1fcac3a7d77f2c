pub mod bus;
pub mod document;
pub mod host;
pub mod map;
pub mod port;

pub use bus::{LinkError, NullBus, RegisterBus};
pub use document::{DocumentError, PortDocument};
pub use host::{HostError, HostInterface};
pub use map::{PortMap, PortMapError};
pub use port::{Address, Direction, Port, CHUNK_WIDTH};
