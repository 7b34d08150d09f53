//! Wire codec: frames an [`Image`](crate::tiff::Image) into a typed block
//! stream wrapped in an HTTP/1.1 envelope, and reconstructs it on the other
//! side without a file handle.

pub mod block;
pub mod deserialize;
pub mod http;
pub mod serialize;

pub use deserialize::deserialize;
pub use serialize::serialize;
