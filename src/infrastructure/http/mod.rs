pub mod record_api;
pub mod rest_client;

pub use record_api::HttpRecordApi;
pub use rest_client::{map_error_response, RestClient};
