/// Rows (and columns) on a squares board.
pub const GRID_SIZE: u8 = 10;

/// Cells on a squares board (`GRID_SIZE * GRID_SIZE`).
pub const GRID_CELLS: u8 = GRID_SIZE * GRID_SIZE;

/// Maximum squares a single assignment run accepts.
pub const MAX_SQUARES: usize = GRID_CELLS as usize;

/// Number of digit labels per axis (0..=9).
pub const DIGITS: u8 = 10;

/// Games in a full bracket (32 + 16 + 8 + 4 + 2 + 1).
pub const BRACKET_GAMES: u32 = 63;
