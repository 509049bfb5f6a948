pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Storage key for the access token.
pub const KEY_TOKEN: &str = "token";

/// Storage key for the refresh token.
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";

/// Storage key for the display theme preference.
pub const KEY_THEME: &str = "theme";
