//! The external monitoring service as seen by the reconciler.

use async_trait::async_trait;
use vigil_healthchecks::{Healthcheck, HealthcheckChannel, HealthcheckResponse, HealthchecksClient};

/// Result of a monitoring service call.
pub type MonitorResult<T> = std::result::Result<T, vigil_healthchecks::Error>;

/// Operations the reconciler needs from the monitoring service.
///
/// `delete` must report an already absent check with an error for which
/// [`vigil_healthchecks::Error::is_not_found`] holds.
#[async_trait]
pub trait MonitorService: Send + Sync {
    /// Every notification channel in the project.
    async fn list_channels(&self) -> MonitorResult<Vec<HealthcheckChannel>>;

    /// Create the check, or update the one sharing its unique name.
    async fn upsert(&self, check: &Healthcheck) -> MonitorResult<HealthcheckResponse>;

    /// Every check in the project.
    async fn list_checks(&self) -> MonitorResult<Vec<HealthcheckResponse>>;

    /// Delete the check with the given identifier.
    async fn delete(&self, id: &str) -> MonitorResult<()>;
}

#[async_trait]
impl MonitorService for HealthchecksClient {
    async fn list_channels(&self) -> MonitorResult<Vec<HealthcheckChannel>> {
        HealthchecksClient::list_channels(self).await
    }

    async fn upsert(&self, check: &Healthcheck) -> MonitorResult<HealthcheckResponse> {
        self.create(check).await
    }

    async fn list_checks(&self) -> MonitorResult<Vec<HealthcheckResponse>> {
        HealthchecksClient::list_checks(self).await
    }

    async fn delete(&self, id: &str) -> MonitorResult<()> {
        HealthchecksClient::delete(self, id).await
    }
}
