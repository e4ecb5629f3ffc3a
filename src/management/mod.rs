mod layout;
mod manifest;

pub use layout::BlobLayout;
pub use layout::Stage;
pub use manifest::FailureManifest;
