pub mod cache;

pub use cache::{CACHE_FORMAT, CACHE_FORMAT_VERSION, CacheFile, load_or_discard};
