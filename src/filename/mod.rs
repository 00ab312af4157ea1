//! PRISM filename grammar: decoding names into metadata and encoding the
//! names that can be built without a folder listing.

pub mod decode;
pub mod encode;
pub mod metadata;

pub use decode::decode;
pub use encode::{normals_file_name, raster_file_name};
pub use metadata::{DateDetails, FileMetadata, ParseFailure, ParsedName, Status, TemporalKind};
