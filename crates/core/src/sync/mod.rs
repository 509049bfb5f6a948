pub mod channel;
pub mod merge;
pub mod synchronizer;

pub use channel::{ChannelFactory, PushChannel, SseChannelFactory, SseDecoder};
pub use merge::merge;
pub use synchronizer::{
    ChannelState, HistoryProvider, PortfolioSynchronizer, SyncOptions, RECONNECT_DELAY,
};
