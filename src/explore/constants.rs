// Constants for the exploration engine

/// Maximum number of nested dispatches before a node is refused
/// Deeper chains can only come from malformed type graphs or extreme sessions
pub const MAX_EXPLORE_DEPTH: usize = 256;
