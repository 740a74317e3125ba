//! Generic access layer over the backend's REST collections.
//!
//! - `query`: search parameters and their query-string encoding.
//! - `fetch`: paginated search plus the "all" and "by id" reads.
//! - `mutation`: create/update returning a success-or-error envelope.
//! - `scroll`: incremental accumulation of pages for infinite lists.
//!
//! Everything here is entity-agnostic: entities only need to be
//! `DeserializeOwned`, request bodies `Serialize`.

pub mod fetch;
pub mod mutation;
pub mod query;
pub mod scroll;

pub use fetch::{get_all, get_by_id, get_one, search};
pub use mutation::{create, mutate, update, Mutation, UpdateMethod};
pub use query::{
    decode_filters, encode_query, search_target, Filter, FilterOrder, FilterParseError,
    SearchParameters, Sort, SortDirection,
};
pub use scroll::{has_more, InfiniteScroll};
