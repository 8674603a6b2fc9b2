mod reference;
mod store;

pub use reference::{generate_uid, ResourceReference};
pub use store::{LocalFileStore, ResourceStore, StoreError};
