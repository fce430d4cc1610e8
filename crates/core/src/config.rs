//! Typed, read-mostly configuration loaded once at startup: a `from_env`
//! constructor plus `with_*` setters so tests can build a `Config` without
//! touching the process environment.

use cineslot_types::AppError;
use std::time::Duration;

/// Credentials and endpoints for one named payment gateway
/// (`/payments/{gateway}/create`), keyed by gateway name since the spec's
/// wire format allows more than one gateway per deployment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub name: String,
    pub tmn_code: String,
    pub hash_secret: String,
    pub url: String,
    pub return_url: String,
    pub algorithm: cineslot_types::enums::SignatureAlgorithm,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub hold_ttl: Duration,
    pub booking_expiry: Duration,
    pub sweep_interval_bookings: Duration,
    pub sweep_interval_holds: Duration,
    pub frontend_url: String,
    pub port: u16,
    pub gateways: Vec<GatewayConfig>,
}

impl Config {
    /// Loads configuration from the process environment (via `dotenvy` in
    /// the binary's `main`, already applied by the time this runs). Returns
    /// `validation` on a malformed value — the caller should treat that as
    /// exit-code-1 startup failure per spec §6.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt_secret = require_env("JWT_SECRET")?;
        let jwt_refresh_secret = require_env("JWT_REFRESH_SECRET")?;

        let hold_ttl_secs = parse_env_u64("HOLD_TTL_SECONDS", 600)?;
        let booking_expiry_secs = parse_env_u64("BOOKING_EXPIRY_SECONDS", 900)?;

        if booking_expiry_secs < hold_ttl_secs {
            return Err(AppError::Validation(format!(
                "BOOKING_EXPIRY_SECONDS ({booking_expiry_secs}) must be >= HOLD_TTL_SECONDS ({hold_ttl_secs})"
            )));
        }

        let sweep_interval_bookings_secs =
            parse_env_u64("SWEEP_INTERVAL_SECONDS", 300)?;
        let sweep_interval_holds_secs =
            parse_env_u64("HOLD_SWEEP_INTERVAL_SECONDS", 600)?;

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let port = parse_env_u64("PORT", 3000)? as u16;

        let gateways = load_gateway_configs()?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_refresh_secret,
            hold_ttl: Duration::from_secs(hold_ttl_secs),
            booking_expiry: Duration::from_secs(booking_expiry_secs),
            sweep_interval_bookings: Duration::from_secs(sweep_interval_bookings_secs),
            sweep_interval_holds: Duration::from_secs(sweep_interval_holds_secs),
            frontend_url,
            port,
            gateways,
        })
    }

    pub fn gateway(&self, name: &str) -> Option<&GatewayConfig> {
        self.gateways.iter().find(|g| g.name == name)
    }

    #[must_use]
    pub fn with_hold_ttl(mut self, ttl: Duration) -> Self {
        self.hold_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_booking_expiry(mut self, expiry: Duration) -> Self {
        self.booking_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateways.retain(|g| g.name != gateway.name);
        self.gateways.push(gateway);
        self
    }

    /// A config with sane test defaults, for unit tests that need a `Config`
    /// but aren't exercising gateway credentials.
    pub fn test_default() -> Self {
        Self {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_refresh_secret: "test-refresh-secret".to_string(),
            hold_ttl: Duration::from_secs(600),
            booking_expiry: Duration::from_secs(900),
            sweep_interval_bookings: Duration::from_secs(300),
            sweep_interval_holds: Duration::from_secs(600),
            frontend_url: "http://localhost:5173".to_string(),
            port: 3000,
            gateways: Vec::new(),
        }
    }
}

/// `GATEWAYS=vnpay,momo` names the gateways to load credential triples for;
/// each reads `{NAME}_TMN_CODE`, `{NAME}_HASH_SECRET`, `{NAME}_URL`,
/// `{NAME}_RETURN_URL`, and an optional `{NAME}_ALGO` (HMACSHA512 default).
fn load_gateway_configs() -> Result<Vec<GatewayConfig>, AppError> {
    let names = std::env::var("GATEWAYS").unwrap_or_default();
    let mut gateways = Vec::new();

    for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let upper = name.to_uppercase();
        let algorithm = std::env::var(format!("{upper}_ALGO"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        gateways.push(GatewayConfig {
            name: name.to_lowercase(),
            tmn_code: require_env(&format!("{upper}_TMN_CODE"))?,
            hash_secret: require_env(&format!("{upper}_HASH_SECRET"))?,
            url: require_env(&format!("{upper}_URL"))?,
            return_url: require_env(&format!("{upper}_RETURN_URL"))?,
            algorithm,
        });
    }

    Ok(gateways)
}

fn require_env(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::Validation(format!("{key} must be set")))
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64, AppError> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|_| AppError::Validation(format!("{key} must be a positive integer"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_expiry_shorter_than_hold() {
        let cfg = Config::test_default().with_booking_expiry(Duration::from_secs(1));
        assert!(cfg.booking_expiry < cfg.hold_ttl);
    }

    #[test]
    fn test_gateway_lookup() {
        let cfg = Config::test_default().with_gateway(GatewayConfig {
            name: "vnpay".to_string(),
            tmn_code: "ABC".to_string(),
            hash_secret: "secret".to_string(),
            url: "https://gw.example/pay".to_string(),
            return_url: "https://app.example/return".to_string(),
            algorithm: cineslot_types::enums::SignatureAlgorithm::HmacSha512,
        });

        assert!(cfg.gateway("vnpay").is_some());
        assert!(cfg.gateway("momo").is_none());
    }
}
