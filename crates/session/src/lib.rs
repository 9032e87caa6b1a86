pub mod error;
pub mod session;
pub mod view;

pub use error::SessionError;
pub use session::{Session, UploadReport};
pub use view::{DisplayRow, SessionView};
