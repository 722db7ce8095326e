pub mod errors;
pub mod id;
pub mod notices;

pub use errors::{ConfigError, GymdeskError};
pub use id::{new_id, new_record_id, SessionId};
pub use notices::{Notice, NoticeLevel, NoticeQueue};

pub type Result<T> = std::result::Result<T, GymdeskError>;
