// ============================================================================
// Basic Usage Example
// ============================================================================

use platform_info::prelude::*;
use platform_info::registry::QUERIES;

fn main() {
    #[cfg(feature = "logging")]
    if let Err(e) = platform_info::utils::init_logging(tracing::Level::DEBUG) {
        eprintln!("{}", e);
    }

    println!("=== Platform Info Example ===\n");

    // First query probes the CPU; every later one is a plain read
    let registry = get_registry();
    println!("{}\n", registry);

    if let Some(identity) = registry.identity() {
        println!("Processor: {}", identity);
    }
    println!("Architecture: {}", registry.architecture());
    println!("Best SIMD level: {}", registry.simd_level());
    println!("Probe: {}\n", registry.probe_name());

    println!("Capability queries:");
    for (feature, query) in QUERIES {
        println!("  {:<10} {}", feature.name(), query());
    }

    // Picking a code path
    let path = if support_avx512f() {
        "AVX-512"
    } else if support_avx2() {
        "AVX2"
    } else if support_arm_neon() {
        "NEON"
    } else if support_sse2() {
        "SSE2"
    } else {
        "scalar"
    };
    println!("\nSelected kernel: {}", path);

    // Configuration arrives too late once the registry exists
    match init_with_config(ProbeConfig::new().with_disabled(Feature::Avx2)) {
        Ok(_) => println!("Configured registry"),
        Err(e) => println!("Configuration rejected: {}", e),
    }

    #[cfg(feature = "serde")]
    match registry.to_json() {
        Ok(json) => println!("\nReport:\n{}", json),
        Err(e) => eprintln!("{}", e),
    }
}
