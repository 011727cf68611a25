//! Places search: provider client, multi-page aggregation and result shaping.

pub mod aggregate;
pub mod format;
pub mod google;
pub mod provider;
pub mod types;

pub use aggregate::SearchService;
pub use google::GoogleMapsClient;
pub use provider::PlacesProvider;
pub use types::{PaginationInfo, PlaceInfo, PlaceQuery, SearchResponse, SearchStatus};
