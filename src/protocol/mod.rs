pub mod framing;
pub mod message;

pub use framing::FramingError;
pub use message::{Request, Response};
