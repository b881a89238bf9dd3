pub mod constants;
pub mod error;
pub mod format;
pub mod record;
pub mod types;

pub use constants::*;
pub use error::{ChainError, FaucetError};
pub use record::ClaimRecord;
pub use types::*;
