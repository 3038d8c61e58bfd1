// Gym Records - Core Library
// Exposes all modules for use in the CLI, the terminal form and tests

pub mod error;
pub mod entities;
pub mod codec;
pub mod storage;
pub mod config;
pub mod console;

// Only compile the terminal form when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use error::{GymError, Result};
pub use entities::{
    FeeSchedule, KindTag, Member, MemberKind, MembershipStatus, PerformanceRecord,
    MemberRegistry,
};
pub use codec::{read_registry, write_registry, write_table, DecodeReport};
pub use storage::{export_table, load_file, save_file, DEFAULT_DATA_FILE};
pub use config::Settings;
pub use console::Console;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
