use cineslot_core::config::GatewayConfig;
use cineslot_types::{AppError, Result};

/// Keyed lookup over the configured payment gateways, the small registry
/// spec §6's `/payments/{gateway}/create` routing needs since a deployment
/// may run more than one named gateway at once.
#[derive(Debug, Clone, Default)]
pub struct GatewayRegistry {
    gateways: Vec<GatewayConfig>,
}

impl GatewayRegistry {
    pub fn new(gateways: Vec<GatewayConfig>) -> Self {
        Self { gateways }
    }

    pub fn get(&self, name: &str) -> Result<&GatewayConfig> {
        self.gateways
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| AppError::NotFound(format!("unknown payment gateway '{name}'")))
    }
}
