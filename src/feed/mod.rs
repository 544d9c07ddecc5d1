pub mod client;
pub mod decoder;
pub mod mappings;
pub mod source;

pub use client::FeedClient;
pub use decoder::decode_feed;
pub use mappings::{LabelMap, MappingCache};
pub use source::FeedSource;
