//! Constants for the download module (parallelism, temporary file names).

/// Connections used when the caller does not ask for a specific count.
pub const DEFAULT_PARALLELISM: usize = 5;

/// Largest accepted connection count.
pub const MAX_PARALLELISM: usize = 16;

/// Suffix of the in-progress file next to the final PDF.
pub const PART_SUFFIX: &str = ".part";

/// Suffix aria2 appends to its control file.
pub const ARIA2_CONTROL_SUFFIX: &str = ".aria2";

/// Program name looked up on `PATH` for segmented downloads.
pub const ARIA2_PROGRAM: &str = "aria2c";
