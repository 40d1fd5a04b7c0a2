pub mod config;
pub mod logging;

// Core lookup engine
pub mod cache;
pub mod engine;
pub mod lookup;
pub mod normalize;
pub mod verdict;

pub use cache::VerdictCache;
pub use engine::{resolve, LookupStats, Resolution};
pub use lookup::{BatchClient, HttpTransport, Transport};
pub use normalize::{normalize, NormalizedUrl};
pub use verdict::{unix_now, Verdict, VerdictRecord};
