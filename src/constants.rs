// =============================================================================
// EVENT LOOP
// =============================================================================

/// Input poll timeout; one tick is emitted per timeout
pub const TICK_MS: u64 = 120;

/// Rows moved by page up / page down
pub const PAGE_SIZE: usize = 10;

// =============================================================================
// LOGGING
// =============================================================================

/// Environment variable overriding the log file location
pub const LOG_FILE_ENV: &str = "KCPLENS_LOG";

/// Log file name inside the temp directory when nothing else is given
pub const DEFAULT_LOG_FILE: &str = "kcplens.log";

/// Filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

// =============================================================================
// UI
// =============================================================================

pub const APP_NAME: &str = "kcplens";

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
