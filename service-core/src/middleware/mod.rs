pub mod firm;
pub mod tracing;

pub use self::firm::{ActorRole, FirmContext};
pub use self::tracing::{REQUEST_ID_HEADER, request_id_middleware};
