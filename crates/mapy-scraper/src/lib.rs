pub mod contact;
pub mod coordinates;
pub mod dedupe;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
mod retry;
pub mod text;
pub mod types;

pub use dedupe::{dedupe, dedupe_key};
pub use error::{FetchError, ScraperError};
pub use fetch::PageFetcher;
pub use normalize::{accept_coordinates, normalize};
pub use orchestrator::MapyScraper;
pub use types::{Coordinates, NormalizedRecord, RawRecord};
