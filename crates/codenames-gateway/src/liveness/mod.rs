//! Connection liveness monitoring

mod monitor;

pub use monitor::{
    LivenessMonitor, LivenessOutcome, LivenessProbe, DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT,
};
