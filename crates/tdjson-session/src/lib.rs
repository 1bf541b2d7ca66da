//! Authorization session over the engine's JSON object protocol.
//!
//! [`TdJsonSession`] turns driver requests into `@type`-tagged JSON objects
//! and decodes the engine's answers. The transport itself stays behind
//! [`TdJsonClient`].

mod codec;
mod session;

pub use codec::{decode_authorization_state, decode_ok, type_of, Request};
pub use session::{TdJsonClient, TdJsonSession};
