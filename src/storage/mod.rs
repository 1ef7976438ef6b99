//! Image hosting for design uploads
//!
//! The fulfillment provider ingests designs by public URL, so embedded images
//! are first hosted on ImgBB through the `ImageHost` seam. `UploadAdapter`
//! applies size and media-type limits before anything leaves the process.

mod imgbb;
mod upload;

pub use imgbb::{ImageHost, ImgbbHost};
pub use upload::{UploadAdapter, UploadError};
