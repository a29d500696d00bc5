use crate::domain::model::{ScanOutcome, ScanRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The external engine that evaluates checks. Nothing in this crate
/// interprets check definitions; implementations hand the request over and
/// report what came back.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, request: &ScanRequest) -> Result<ScanOutcome>;
}
