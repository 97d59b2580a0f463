pub mod bridge_adapter;
pub mod button;
pub mod config;
pub mod hardware;
pub mod process;
pub mod process_engine;
pub mod shell_system;
pub mod spotify_catalog;
pub mod status_log;
pub mod ytdlp_resolver;

pub use hatbox_link::types as bridge_types;
