/// Supervision polling interval when none is configured (one "time unit").
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
/// Instances started per worker when `instances` is omitted.
pub const DEFAULT_INSTANCES: usize = 1;
/// Separator between a worker's `location` and `class` in its implementation reference.
pub const IMPLEMENTATION_REF_SEPARATOR: &str = ".";
