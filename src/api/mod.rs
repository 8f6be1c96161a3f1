pub mod datastore;
pub mod messaging;
pub mod place_publishing;
