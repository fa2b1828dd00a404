/*
[INPUT]:  HTTP client configuration, request signer and listing filters
[OUTPUT]: Paginated cursors over REST collections
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod public;
pub mod signature;
pub mod user;

pub use error::{GdaxError, Result};
pub use signature::{NoAuth, RequestSigner, SigningInput};

pub use client::{ClientConfig, GdaxClient};
