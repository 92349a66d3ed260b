pub mod no_duplicate_keys;
pub mod no_empty_keys;
pub mod no_unnormalized_keys;
pub mod no_unsafe_values;
pub mod top_level_interop;

pub use no_duplicate_keys::NoDuplicateKeys;
pub use no_empty_keys::NoEmptyKeys;
pub use no_unnormalized_keys::NoUnnormalizedKeys;
pub use no_unsafe_values::NoUnsafeValues;
pub use top_level_interop::TopLevelInterop;
