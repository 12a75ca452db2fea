//! Forest persistence in the fixed-width binary node format.
//!
//! See [`codec`] for the layout. Writing never fails for a forest built by
//! this crate; reading rejects truncated records, unknown tags, negative
//! features and trees that fail structural validation.

pub mod codec;
mod error;

pub use codec::{
    NODE_RECORD_SIZE, load_forest, read_forest, save_forest, tree_record_size, write_forest,
};
pub use error::{ReadError, WriteError};
