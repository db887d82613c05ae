// ---------------------------------------------------------------------------
// Pipeline: host-facing load and save entry points
// ---------------------------------------------------------------------------
//
// Load runs in fixed stages:
//   1. validate settings (fail fast on an impossible limit)
//   2. selector picks the buffer source
//   3. buffer installed, attribute store sized to match
//   4. overlay containers (flags, scaling, snapping)
//   5. end-of-load bulk update
//
// Save writes the expansion container when the buffer is larger than native
// plus the three overlays.

mod load;
mod save;

pub use load::{load_trees, TreeLoadReport};
pub use save::{save_trees, TreeSaveReport};

#[cfg(test)]
mod tests_fresh_expansion;
#[cfg(test)]
mod tests_overlays;
#[cfg(test)]
mod tests_roundtrip;
#[cfg(test)]
pub(crate) mod test_host;
