use std::collections::HashSet;
use std::env;
use std::process::Command;

// CPU features that select a hardware tile kernel
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    // every one of these must be reported by the CPU
    required_flags: &'static [&'static str],
    cfg_flag: &'static str,
    // oldest stable rustc exposing the intrinsics we use
    min_rustc_minor: u32,
    detected: bool,
}

impl CpuFeature {
    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2+fma",
                required_flags: &["avx2", "fma"],
                cfg_flag: "avx2",
                min_rustc_minor: 27,
                detected: false,
            },
            CpuFeature {
                name: "avx512f",
                required_flags: &["avx512f"],
                cfg_flag: "avx512",
                min_rustc_minor: 89,
                detected: false,
            },
        ]
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let flags: HashSet<String> = cpuinfo
                .lines()
                .filter(|line| line.starts_with("flags"))
                .filter_map(|line| line.split(':').nth(1))
                .flat_map(|list| list.split_whitespace())
                .map(str::to_lowercase)
                .collect();

            for feature in features.iter_mut() {
                feature.detected = feature
                    .required_flags
                    .iter()
                    .all(|flag| flags.contains(*flag));
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                feature.detected = feature.required_flags.iter().all(|flag| {
                    let key = match *flag {
                        "avx2" => "hw.optional.avx2_0: 1",
                        "fma" => "hw.optional.fma: 1",
                        "avx512f" => "hw.optional.avx512f: 1",
                        _ => return false,
                    };
                    contents.contains(key)
                });
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    /// Minor version of the active rustc, e.g. `89` for `rustc 1.89.0`.
    fn rustc_minor() -> Option<u32> {
        let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
        let output = Command::new(rustc).arg("--version").output().ok()?;
        let version_info = String::from_utf8_lossy(&output.stdout);

        version_info
            .split_whitespace()
            .nth(1)?
            .split('.')
            .nth(1)?
            .parse()
            .ok()
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    fn apply(features: &[CpuFeature], rustc_minor: u32) {
        for feature in features {
            println!("cargo::rustc-check-cfg=cfg({})", feature.cfg_flag);

            if feature.detected && rustc_minor >= feature.min_rustc_minor {
                println!("enabling {} tile kernel", feature.name);
                println!("cargo:rustc-cfg={}", feature.cfg_flag);
            }
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut features = CpuFeature::features();

    // Only run CPU detection for native x86 builds
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    let is_native_build = host == target;
    let is_x86 = target_arch == "x86_64" || target_arch == "x86";

    if is_native_build && is_x86 {
        PlatformDetector::detect_cpu_features(&mut features);
    }

    let rustc_minor = PlatformDetector::rustc_minor().unwrap_or(0);

    PlatformDetector::apply(&features, rustc_minor);
}
