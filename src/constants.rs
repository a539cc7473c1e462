// Constants shared by the walkers, the renderer and the host memory model

/// Maximum number of nodes a list walker emits before truncating
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Maximum number of occupied buckets a table walker emits before truncating
pub const DEFAULT_TABLE_LIMIT: usize = 20;

/// Maximum nesting depth the renderer descends before printing `{...}`
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Starting address for heap blocks
/// Heap addresses start at 0x10000000 so they never collide with null
pub const HEAP_ADDRESS_START: u64 = 0x1000_0000;

/// Address stride between consecutive heap blocks
pub const HEAP_BLOCK_ALIGN: u64 = 0x20;
