pub mod api;
pub mod client;
pub mod fanout;
pub mod models;
pub mod paginate;
pub mod utils;

pub use api::LookerApi;
pub use client::LookerClient;
pub use fanout::fan_out;
pub use paginate::{Exhaustion, collect_pages};
pub use utils::retry::{RetryPolicy, retry_with_backoff};
