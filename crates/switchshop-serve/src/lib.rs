//! HTTP file delivery for switchshop.
//!
//! [`prepare_response`] is the heart of the crate: it resolves a requested
//! name through the [`LibraryIndex`](switchshop_index::LibraryIndex), picks a
//! content type, stats the file, encodes `Content-Disposition` for any
//! Unicode name and attaches a lazily read [`FileBody`]. [`router`] and
//! [`ShopServer`] are a thin axum shell around it.

mod body;
pub mod disposition;
mod delivery;
mod routes;
mod server;

pub use body::FileBody;
pub use delivery::{DeliveryBody, DeliveryResponse, DeliveryStage, prepare_response};
pub use routes::{ListingEntry, SHOP_PATH, download_href, format_size, router};
pub use server::{ServeError, ShopServer};
