pub mod sort_keys;

pub use sort_keys::SortKeys;
