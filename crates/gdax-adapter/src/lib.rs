/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public GDAX adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod feed;
pub mod http;
pub mod pagination;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    GdaxClient,
    GdaxError,
    NoAuth,
    RequestSigner,
    Result,
    SigningInput,
};

// Re-export pagination entry points
pub use pagination::{Cursor, Direction, PageFetcher, PageRequest, PaginationParams, RawPage};

// Re-export all types
pub use types::*;

// Re-export commonly used types from feed
pub use feed::{
    decode_message,
    ChangeEntry,
    FeedConfig,
    FeedConnection,
    FeedEvent,
    FeedMessage,
    FeedReader,
    FrameSource,
    MessageChannel,
    PriceSizeEntry,
    SubscribeRequest,
};
