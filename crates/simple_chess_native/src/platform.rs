//! # Platform Resolver
//!
//! Maps `(OS name, architecture, runtime hints)` to a [`Target`]: the
//! directory pair under which the matching prebuilt engine is stored.
//!
//! ```text
//! "Linux" + "amd64"                     → Target::Linux(X86_64)      → linux/x86_64
//! "Mac OS X" + "aarch64"                → Target::MacOs(Arm64)       → macos/arm64
//! "Linux" + vendor "Android" + "arm64"  → Target::Android(Arm64V8a)  → android/arm64-v8a
//! ```
//!
//! Desktop hosts fail hard on anything unrecognized. Android has exactly one
//! documented default: when neither the reported ABI nor the architecture
//! string names a bucket, `arm64-v8a` is used.

use crate::error::{PlatformError, PlatformResult};

/// Operating systems we ship binaries for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Desktop Linux.
    Linux,
    /// Windows.
    Windows,
    /// macOS.
    MacOs,
    /// Android (Linux kernel, own ABI buckets).
    Android,
}

impl Platform {
    /// Directory name under `/native/`.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Android => "android",
        }
    }
}

/// Desktop processor architectures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 32-bit x86.
    X86,
    /// x86-64 / amd64.
    X86_64,
    /// 32-bit ARM.
    Arm,
    /// AArch64.
    Arm64,
}

impl Architecture {
    /// Directory name under the platform directory.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
        }
    }
}

/// Android ABI buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AndroidAbi {
    /// 64-bit ARM. Also the documented default.
    Arm64V8a,
    /// 32-bit ARM.
    ArmeabiV7a,
    /// x86-64 (emulators, some Chromebooks).
    X86_64,
    /// 32-bit x86.
    X86,
}

impl AndroidAbi {
    /// Directory name under `android/`.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Arm64V8a => "arm64-v8a",
            Self::ArmeabiV7a => "armeabi-v7a",
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
        }
    }
}

/// A resolved `(platform, architecture)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// Linux on a desktop architecture.
    Linux(Architecture),
    /// Windows on a desktop architecture.
    Windows(Architecture),
    /// macOS on a desktop architecture.
    MacOs(Architecture),
    /// Android on one of its ABI buckets.
    Android(AndroidAbi),
}

impl Target {
    /// The platform half.
    #[must_use]
    pub const fn platform(self) -> Platform {
        match self {
            Self::Linux(_) => Platform::Linux,
            Self::Windows(_) => Platform::Windows,
            Self::MacOs(_) => Platform::MacOs,
            Self::Android(_) => Platform::Android,
        }
    }

    /// Platform directory name.
    #[must_use]
    pub const fn platform_dir(self) -> &'static str {
        self.platform().dir_name()
    }

    /// Architecture directory name.
    #[must_use]
    pub const fn arch_dir(self) -> &'static str {
        match self {
            Self::Linux(arch) | Self::Windows(arch) | Self::MacOs(arch) => arch.dir_name(),
            Self::Android(abi) => abi.dir_name(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.platform_dir(), self.arch_dir())
    }
}

/// Vendor and VM facts that tell Android apart from plain Linux.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeHints {
    /// Runtime vendor string.
    pub vendor: Option<String>,
    /// Virtual machine name.
    pub vm_name: Option<String>,
    /// Specification vendor string.
    pub specification_vendor: Option<String>,
    /// Android `ro.product.cpu.abi`, when it could be read.
    pub cpu_abi: Option<String>,
}

impl RuntimeHints {
    /// Whether the hints identify an Android runtime.
    #[must_use]
    pub fn indicates_android(&self) -> bool {
        let has = |value: &Option<String>, needle: &str| {
            value.as_deref().is_some_and(|v| v.to_lowercase().contains(needle))
        };
        has(&self.vendor, "android")
            || has(&self.vm_name, "dalvik")
            || has(&self.specification_vendor, "android")
    }
}

/// What the resolver is fed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostInfo {
    /// OS name, e.g. `linux`, `Windows 11`, `Mac OS X`.
    pub os_name: String,
    /// Architecture, e.g. `x86_64`, `amd64`, `aarch64`.
    pub arch: String,
    /// Android detection hints.
    pub hints: RuntimeHints,
}

impl HostInfo {
    /// Host description with no runtime hints.
    #[must_use]
    pub fn new(os_name: impl Into<String>, arch: impl Into<String>) -> Self {
        Self { os_name: os_name.into(), arch: arch.into(), hints: RuntimeHints::default() }
    }

    /// Replaces the runtime hints.
    #[must_use]
    pub fn with_hints(mut self, hints: RuntimeHints) -> Self {
        self.hints = hints;
        self
    }

    /// Describes the running process.
    ///
    /// OS and architecture come from the compile target. On Android builds,
    /// and on Linux builds running inside an Android userland (detected by
    /// `ANDROID_ROOT`), the vendor hint is set and the CPU ABI is read from
    /// the system property.
    #[must_use]
    pub fn detect() -> Self {
        let os_name = std::env::consts::OS.to_string();
        let arch = std::env::consts::ARCH.to_string();

        let mut hints = RuntimeHints::default();
        if cfg!(target_os = "android") || std::env::var_os("ANDROID_ROOT").is_some() {
            hints.vendor = Some("android".to_string());
            hints.cpu_abi = read_android_cpu_abi();
        }

        tracing::debug!(os = %os_name, arch = %arch, ?hints, "detected host");
        Self { os_name, arch, hints }
    }
}

/// Reads `ro.product.cpu.abi` through `getprop`. Best effort.
fn read_android_cpu_abi() -> Option<String> {
    let output = std::process::Command::new("getprop")
        .arg("ro.product.cpu.abi")
        .output()
        .ok()?;
    let abi = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !abi.is_empty()).then_some(abi)
}

/// Resolves a host to its payload target.
pub fn resolve(host: &HostInfo) -> PlatformResult<Target> {
    let target = match detect_platform(&host.os_name, &host.hints)? {
        Platform::Linux => Target::Linux(desktop_architecture(&host.arch)?),
        Platform::Windows => Target::Windows(desktop_architecture(&host.arch)?),
        Platform::MacOs => Target::MacOs(desktop_architecture(&host.arch)?),
        Platform::Android => Target::Android(android_abi(&host.arch, &host.hints)),
    };
    tracing::info!(%target, os = %host.os_name, arch = %host.arch, "resolved native target");
    Ok(target)
}

/// Classifies an OS name.
pub fn detect_platform(os_name: &str, hints: &RuntimeHints) -> PlatformResult<Platform> {
    let os = os_name.to_lowercase();

    if os.contains("android") {
        Ok(Platform::Android)
    } else if os.contains("linux") {
        if hints.indicates_android() {
            Ok(Platform::Android)
        } else {
            Ok(Platform::Linux)
        }
    } else if os.contains("windows") {
        Ok(Platform::Windows)
    } else if os.contains("mac") || os.contains("darwin") {
        Ok(Platform::MacOs)
    } else {
        Err(PlatformError::UnsupportedPlatform { os: os_name.to_string() })
    }
}

/// Classifies a desktop architecture string. 64-bit names are tested before
/// their 32-bit prefixes.
pub fn desktop_architecture(arch: &str) -> PlatformResult<Architecture> {
    let lower = arch.to_lowercase();

    if lower.contains("amd64") || lower.contains("x86_64") {
        Ok(Architecture::X86_64)
    } else if lower.contains("x86") || lower == "i386" || lower == "i686" {
        Ok(Architecture::X86)
    } else if lower.contains("aarch64") || lower.contains("arm64") {
        Ok(Architecture::Arm64)
    } else if lower.contains("arm") {
        Ok(Architecture::Arm)
    } else {
        Err(PlatformError::UnsupportedArchitecture { arch: arch.to_string() })
    }
}

/// Picks an Android ABI bucket: reported ABI first, then the architecture
/// string, then `arm64-v8a`.
#[must_use]
pub fn android_abi(arch: &str, hints: &RuntimeHints) -> AndroidAbi {
    if let Some(abi) = hints.cpu_abi.as_deref().and_then(abi_from_property) {
        return abi;
    }

    let lower = arch.to_lowercase();
    if lower.contains("aarch64") || lower.contains("arm64") {
        AndroidAbi::Arm64V8a
    } else if lower.contains("arm") {
        AndroidAbi::ArmeabiV7a
    } else if lower.contains("x86_64") || lower.contains("amd64") {
        AndroidAbi::X86_64
    } else if lower.contains("x86") {
        AndroidAbi::X86
    } else {
        tracing::warn!(arch, "unrecognized Android architecture, defaulting to arm64-v8a");
        AndroidAbi::Arm64V8a
    }
}

fn abi_from_property(abi: &str) -> Option<AndroidAbi> {
    if abi.starts_with("arm64") || abi.starts_with("aarch64") {
        Some(AndroidAbi::Arm64V8a)
    } else if abi.starts_with("armeabi-v7a") || abi.starts_with("arm") {
        Some(AndroidAbi::ArmeabiV7a)
    } else if abi == "x86_64" {
        Some(AndroidAbi::X86_64)
    } else if abi == "x86" {
        Some(AndroidAbi::X86)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn android_hints() -> RuntimeHints {
        RuntimeHints { vendor: Some("The Android Project".into()), ..RuntimeHints::default() }
    }

    #[test]
    fn test_desktop_targets() {
        assert_eq!(resolve(&HostInfo::new("Linux", "amd64")), Ok(Target::Linux(Architecture::X86_64)));
        assert_eq!(resolve(&HostInfo::new("linux", "x86")), Ok(Target::Linux(Architecture::X86)));
        assert_eq!(resolve(&HostInfo::new("Windows 10", "x86_64")), Ok(Target::Windows(Architecture::X86_64)));
        assert_eq!(resolve(&HostInfo::new("Mac OS X", "aarch64")), Ok(Target::MacOs(Architecture::Arm64)));
        assert_eq!(resolve(&HostInfo::new("macos", "aarch64")), Ok(Target::MacOs(Architecture::Arm64)));
        assert_eq!(resolve(&HostInfo::new("Darwin", "x86_64")), Ok(Target::MacOs(Architecture::X86_64)));
        assert_eq!(resolve(&HostInfo::new("linux", "arm")), Ok(Target::Linux(Architecture::Arm)));
    }

    #[test]
    fn test_target_dirs() {
        let target = Target::Android(AndroidAbi::ArmeabiV7a);
        assert_eq!(target.platform_dir(), "android");
        assert_eq!(target.arch_dir(), "armeabi-v7a");
        assert_eq!(Target::Windows(Architecture::X86).to_string(), "windows/x86");
    }

    #[test]
    fn test_unsupported_platform() {
        assert_eq!(
            resolve(&HostInfo::new("SunOS", "x86_64")),
            Err(PlatformError::UnsupportedPlatform { os: "SunOS".into() })
        );
    }

    #[test]
    fn test_unsupported_desktop_architecture() {
        assert_eq!(
            resolve(&HostInfo::new("Linux", "riscv64")),
            Err(PlatformError::UnsupportedArchitecture { arch: "riscv64".into() })
        );
        assert!(resolve(&HostInfo::new("Windows", "ppc64le")).is_err());
    }

    #[test]
    fn test_android_detected_from_hints() {
        let host = HostInfo::new("Linux", "aarch64").with_hints(android_hints());
        assert_eq!(resolve(&host), Ok(Target::Android(AndroidAbi::Arm64V8a)));

        let dalvik = RuntimeHints { vm_name: Some("Dalvik".into()), ..RuntimeHints::default() };
        assert_eq!(detect_platform("Linux", &dalvik), Ok(Platform::Android));

        let vendor_hint = RuntimeHints { specification_vendor: Some("Android".into()), ..RuntimeHints::default() };
        assert_eq!(detect_platform("Linux", &vendor_hint), Ok(Platform::Android));

        assert_eq!(detect_platform("android", &RuntimeHints::default()), Ok(Platform::Android));
    }

    #[test]
    fn test_android_abi_property_wins() {
        let hints = RuntimeHints { cpu_abi: Some("x86_64".into()), ..android_hints() };
        assert_eq!(android_abi("aarch64", &hints), AndroidAbi::X86_64);

        let hints = RuntimeHints { cpu_abi: Some("armeabi-v7a".into()), ..android_hints() };
        assert_eq!(android_abi("x86", &hints), AndroidAbi::ArmeabiV7a);
    }

    #[test]
    fn test_android_abi_from_arch() {
        let hints = android_hints();
        assert_eq!(android_abi("armv7l", &hints), AndroidAbi::ArmeabiV7a);
        assert_eq!(android_abi("amd64", &hints), AndroidAbi::X86_64);
        assert_eq!(android_abi("i686-x86", &hints), AndroidAbi::X86);

        // unknown property falls through to the architecture string
        let hints = RuntimeHints { cpu_abi: Some("mips".into()), ..android_hints() };
        assert_eq!(android_abi("aarch64", &hints), AndroidAbi::Arm64V8a);
    }

    #[test]
    fn test_android_default_bucket() {
        let host = HostInfo::new("Linux", "riscv64").with_hints(android_hints());
        assert_eq!(resolve(&host), Ok(Target::Android(AndroidAbi::Arm64V8a)));
    }

    #[test]
    fn test_detect_matches_compile_target() {
        let host = HostInfo::detect();
        assert_eq!(host.os_name, std::env::consts::OS);
        assert_eq!(host.arch, std::env::consts::ARCH);
    }
}
