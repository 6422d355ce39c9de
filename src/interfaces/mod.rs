// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod probe;

pub use probe::{CapabilityProbe, CpuIdentity};
