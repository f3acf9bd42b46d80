pub mod paginate;
pub mod response;
pub mod transport;

pub use response::ApiPage;
pub use transport::CdoClient;
