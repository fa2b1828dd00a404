/*
[INPUT]:  Page fetcher collaborator and fixed listing filters
[OUTPUT]: Forward-only cursors over paginated REST collections
[POS]:    Pagination layer - continuation-token traversal
[UPDATE]: When the pagination headers or cursor contract change
*/

pub mod cursor;
pub mod params;

pub use cursor::{Cursor, PageFetcher, PageRequest, RawPage};
pub use params::{Direction, PaginationParams};
