//! Spend pipeline: request validation, coin selection, transaction building
//! and orchestration

pub mod builder;
pub mod request;
pub mod selector;
pub mod spend;

pub use builder::{build_unsigned, BuildError, MAX_OUTPUT_VALUE};
pub use request::{RequestError, SpendRequest, MIN_RECEIVER_LEN};
pub use selector::{select, Policy, Selection, MAX_SELECTED_INPUTS};
pub use spend::{spend, SpendError};
