//! Constants of the `.kla` binary layout format

pub const MAGIC: &[u8; 4] = b"KLAY";
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

/// Magic, version, id, name length and the three section counts
pub const MIN_FILE_SIZE: usize = 4 + 2 + 8 + 2 + 6;

// Key binding flags
pub const KEY_HAS_OUTPUT: u8 = 0x01;
pub const KEY_HAS_ACTION: u8 = 0x02;

// Transition kinds
pub const TRANSITION_EMIT: u8 = 0;
pub const TRANSITION_ADVANCE: u8 = 1;

// Transition scopes
pub const SCOPE_BASELINE: u8 = 0;
pub const SCOPE_STATE: u8 = 1;
