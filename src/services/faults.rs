use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::FetchError;

/// Decides whether a simulated call fails before it reaches the store.
/// Sampled once per attempt; a retried attempt draws a fresh sample.
pub trait FaultPolicy: Send + Sync {
    fn sample(&self) -> Option<FetchError>;
}

/// Random fault injection: a transient network failure is drawn first, then
/// a validation failure, so the two are mutually exclusive within a single
/// sample. Draws are independent across attempts.
pub struct RandomFaults {
    network_rate: f64,
    validation_rate: f64,
}

impl RandomFaults {
    pub fn new(network_rate: f64, validation_rate: f64) -> Self {
        Self {
            network_rate,
            validation_rate,
        }
    }
}

impl Default for RandomFaults {
    fn default() -> Self {
        Self::new(0.10, 0.05)
    }
}

impl FaultPolicy for RandomFaults {
    fn sample(&self) -> Option<FetchError> {
        if rand::random::<f64>() < self.network_rate {
            return Some(FetchError::Network { status: 503 });
        }
        if rand::random::<f64>() < self.validation_rate {
            return Some(FetchError::Validation(
                "simulated invalid request".to_string(),
            ));
        }
        None
    }
}

/// Never injects anything. For tests and latency-only local runs.
pub struct NoFaults;

impl FaultPolicy for NoFaults {
    fn sample(&self) -> Option<FetchError> {
        None
    }
}

/// Replays a fixed sequence of outcomes, then stays clean. Lets tests force
/// an exact failure pattern instead of sampling probabilities.
pub struct ScriptedFaults {
    script: Mutex<VecDeque<Option<FetchError>>>,
}

impl ScriptedFaults {
    pub fn new(script: Vec<Option<FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl FaultPolicy for ScriptedFaults {
    fn sample(&self) -> Option<FetchError> {
        self.script
            .lock()
            .expect("fault script mutex poisoned")
            .pop_front()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_faults_replay_in_order_then_stay_clean() {
        let faults = ScriptedFaults::new(vec![
            Some(FetchError::Network { status: 503 }),
            None,
            Some(FetchError::Validation("bad".to_string())),
        ]);

        assert!(matches!(
            faults.sample(),
            Some(FetchError::Network { status: 503 })
        ));
        assert!(faults.sample().is_none());
        assert!(matches!(faults.sample(), Some(FetchError::Validation(_))));
        assert!(faults.sample().is_none());
        assert!(faults.sample().is_none());
    }

    #[test]
    fn rate_extremes_are_deterministic() {
        let always = RandomFaults::new(1.0, 0.0);
        for _ in 0..10 {
            assert!(matches!(
                always.sample(),
                Some(FetchError::Network { status: 503 })
            ));
        }

        let never = RandomFaults::new(0.0, 0.0);
        for _ in 0..10 {
            assert!(never.sample().is_none());
        }

        // network is drawn first, so a certain network fault shadows a
        // certain validation fault
        let both = RandomFaults::new(1.0, 1.0);
        assert!(matches!(
            both.sample(),
            Some(FetchError::Network { status: 503 })
        ));

        let validation_only = RandomFaults::new(0.0, 1.0);
        assert!(matches!(
            validation_only.sample(),
            Some(FetchError::Validation(_))
        ));
    }
}
