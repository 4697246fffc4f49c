pub mod cache;
pub mod directory;
pub mod doctor;
mod wire;

pub use cache::{ZoneCache, ZoneSnapshot};
pub use directory::{DirectoryConfig, FetchError, HttpZoneDirectory, ZoneDirectory};
