use std::env;
use std::net::SocketAddr;

use tracing::warn;

use crate::services::RandomFaults;

/// Runtime configuration, environment-driven with defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub network_fault_rate: f64,
    pub validation_fault_rate: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warn!("ignoring invalid BIND_ADDR {:?}", raw);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

        Self {
            bind_addr,
            network_fault_rate: env_rate("NETWORK_FAULT_RATE", 0.10),
            validation_fault_rate: env_rate("VALIDATION_FAULT_RATE", 0.05),
        }
    }

    pub fn fault_policy(&self) -> RandomFaults {
        RandomFaults::new(self.network_fault_rate, self.validation_fault_rate)
    }
}

fn env_rate(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(raw) => match raw.parse::<f64>() {
            Ok(rate) if (0.0..=1.0).contains(&rate) => rate,
            _ => {
                warn!("ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
