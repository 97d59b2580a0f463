mod client;

pub use hatbox_link_types as types;
pub use client::{Client, ConversationControl, ServerRx, connect, connect_with_config};
pub use client::config::{Config, ConfigBuilder};
pub use client::stats::Stats;
