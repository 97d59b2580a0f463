pub const BRIDGE_TOKEN: &str = "BRIDGE_TOKEN";
pub const BRIDGE_URL: &str = "BRIDGE_URL";

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8765";
pub const DEFAULT_CAPACITY: usize = 256;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
