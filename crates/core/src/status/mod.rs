//! Status store: the single owner of every job's live status record.

mod handle;
mod store;
mod types;

pub use handle::*;
pub use store::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status store is closed")]
    StoreClosed,
}
