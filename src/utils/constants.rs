//! Shared constants and invariants

pub const API_BASE_URL: &str = "https://api.panel.rtbhouse.com";
pub const API_VERSION: &str = "v5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Page size requested from cursor-paginated endpoints
pub const MAX_CURSOR_ROWS: u32 = 10_000;

pub const USER_AGENT: &str = concat!("rtbhouse-rust-sdk/", env!("CARGO_PKG_VERSION"));
pub const API_VERSION_HEADER: &str = "X-Current-Api-Version";
pub const RESOURCE_USAGE_HEADER: &str = "X-Resource-Usage";

pub const DEFAULT_TOKEN_CONFIGURE_ENV_VAR: &str = "RTBH_API_TOKEN";
pub const DEFAULT_TOKEN_FILE_PATH: &str = "~/.rtbhouse/api_token.json";

// invariant: DEFAULT_EXPIRATION_MARGIN_SECS < DEFAULT_ROTATION_WINDOW_SECS
pub const DEFAULT_EXPIRATION_MARGIN_SECS: u64 = 60;
pub const DEFAULT_ROTATION_WINDOW_SECS: u64 = 4 * 24 * 60 * 60;

pub const EXPIRED_MSG: &str = "API token expired. Please manually create a new one and configure it by calling the configure() method.";
pub const ROTATION_REFUSED_MSG: &str = "Couldn't rotate API token and it may expire soon. Please check whether it has already been rotated.";
