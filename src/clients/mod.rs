#[cfg(test)]
pub(crate) mod fake;
pub mod gateway;
pub mod screener_client;

pub use gateway::{
    BulkEmailRequest, CandidateUpdate, EmailMessage, HealthStatus, ScreenerGateway, UploadAck,
};
pub use screener_client::ScreenerClient;
