/*
[INPUT]:  Raw feed frames and subscription requests
[OUTPUT]: Decoded feed envelopes and typed feed events
[POS]:    Feed layer - real-time message decoding and transport
[UPDATE]: When adding message types or changing connection logic
*/

pub mod client;
pub mod event;
pub mod message;
pub mod subscribe;

pub use client::{FeedConfig, FeedConnection, FeedReader, FrameSource};
pub use event::{
    Activate, BookSnapshot, BookUpdate, Change, Done, FeedEvent, Heartbeat, Match, Open, Received,
    Ticker,
};
pub use message::{decode_message, ChangeEntry, FeedMessage, MessageChannel, PriceSizeEntry};
pub use subscribe::{SubscribeAction, SubscribeRequest, SubscriptionAuth};
