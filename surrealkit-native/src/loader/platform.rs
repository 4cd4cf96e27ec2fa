//! Mapping runtime platform facts onto a bundled artifact.
//!
//! The facts are canonicalized into an [`OsFamily`] and an [`ArchFamily`],
//! then looked up in a fixed table. Anything the table doesn't name is
//! unsupported; there is no fallback artifact.

use super::error::LoadError;

/// Directory inside a [`ResourceBundle`](super::ResourceBundle) holding one
/// subdirectory per platform.
pub const NATIVES_ROOT: &str = "natives";

/// A platform that ships a bundled native library.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum Platform {
    /// Android on aarch64.
    #[strum(serialize = "android_arm64")]
    AndroidArm64,
    /// Android on `x86_64`.
    #[strum(serialize = "android_64")]
    Android64,
    /// Linux on aarch64.
    #[strum(serialize = "linux_arm64")]
    LinuxArm64,
    /// Linux on `x86_64`.
    #[strum(serialize = "linux_64")]
    Linux64,
    /// Windows on `x86_64`.
    #[strum(serialize = "windows_64")]
    Windows64,
    /// macOS on Apple silicon.
    #[strum(serialize = "osx_arm64")]
    OsxArm64,
    /// macOS on Intel.
    #[strum(serialize = "osx_64")]
    Osx64,
}

/// Canonical operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OsFamily {
    /// Android (detected from the vendor or the OS name).
    Android,
    /// Any other Linux.
    Linux,
    /// macOS / Darwin.
    MacOs,
    /// Windows.
    Windows,
}

/// Canonical CPU architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ArchFamily {
    /// `x86_64` / amd64.
    #[strum(serialize = "x86_64")]
    X86_64,
    /// aarch64 / arm64.
    #[strum(serialize = "aarch64")]
    Aarch64,
}

const PLATFORMS: [(OsFamily, ArchFamily, Platform); 7] = [
    (OsFamily::Android, ArchFamily::Aarch64, Platform::AndroidArm64),
    (OsFamily::Android, ArchFamily::X86_64, Platform::Android64),
    (OsFamily::Linux, ArchFamily::Aarch64, Platform::LinuxArm64),
    (OsFamily::Linux, ArchFamily::X86_64, Platform::Linux64),
    (OsFamily::Windows, ArchFamily::X86_64, Platform::Windows64),
    (OsFamily::MacOs, ArchFamily::Aarch64, Platform::OsxArm64),
    (OsFamily::MacOs, ArchFamily::X86_64, Platform::Osx64),
];

impl Platform {
    /// Stable identifier, used as the bundle subdirectory name.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// Operating system family of this platform.
    #[must_use]
    pub const fn os(self) -> OsFamily {
        match self {
            Self::AndroidArm64 | Self::Android64 => OsFamily::Android,
            Self::LinuxArm64 | Self::Linux64 => OsFamily::Linux,
            Self::Windows64 => OsFamily::Windows,
            Self::OsxArm64 | Self::Osx64 => OsFamily::MacOs,
        }
    }

    /// CPU architecture family of this platform.
    #[must_use]
    pub const fn arch(self) -> ArchFamily {
        match self {
            Self::AndroidArm64 | Self::LinuxArm64 | Self::OsxArm64 => ArchFamily::Aarch64,
            Self::Android64 | Self::Linux64 | Self::Windows64 | Self::Osx64 => {
                ArchFamily::X86_64
            }
        }
    }

    /// Resolves platform facts to a supported platform.
    ///
    /// # Errors
    ///
    /// [`LoadError::UnsupportedPlatform`] when either family is unknown, the
    /// architecture is ambiguous, or the pair has no artifact.
    pub fn resolve(facts: &PlatformFacts) -> Result<Self, LoadError> {
        let os = facts.os_family();
        let arch = facts.arch_family();
        PLATFORMS
            .iter()
            .find(|(o, a, _)| Some(*o) == os && Some(*a) == arch)
            .map(|(_, _, platform)| *platform)
            .ok_or_else(|| LoadError::UnsupportedPlatform {
                vendor: facts.vendor.clone(),
                os: facts.os_name.clone(),
                arch: facts.arch.clone(),
            })
    }

    /// Resolves the platform the current process runs on.
    ///
    /// # Errors
    ///
    /// See [`Platform::resolve`].
    pub fn current() -> Result<Self, LoadError> {
        Self::resolve(&PlatformFacts::current())
    }

    /// File name of the library `name` on this platform.
    #[must_use]
    pub fn library_filename(self, name: &str) -> String {
        self.os().library_filename(name)
    }

    /// Bundle-relative path of the library `name` for this platform.
    #[must_use]
    pub fn resource_path(self, name: &str) -> String {
        format!("{NATIVES_ROOT}/{}/{}", self.id(), self.library_filename(name))
    }
}

impl OsFamily {
    /// File name of the dynamic library `name` under this OS's convention.
    #[must_use]
    pub fn library_filename(self, name: &str) -> String {
        match self {
            Self::Android | Self::Linux => format!("lib{name}.so"),
            Self::MacOs => format!("lib{name}.dylib"),
            Self::Windows => format!("{name}.dll"),
        }
    }
}

/// File name of the dynamic library `name` under the host's convention.
#[must_use]
pub fn host_library_filename(name: &str) -> String {
    format!(
        "{}{name}{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

/// Raw platform description: runtime vendor, OS name and architecture.
///
/// Stored lower-cased; matching is by substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFacts {
    vendor: String,
    os_name: String,
    arch: String,
}

impl PlatformFacts {
    /// Builds facts from arbitrary strings.
    #[must_use]
    pub fn new(vendor: &str, os_name: &str, arch: &str) -> Self {
        Self {
            vendor: vendor.to_lowercase(),
            os_name: os_name.to_lowercase(),
            arch: arch.to_lowercase(),
        }
    }

    /// Facts describing the current process.
    #[must_use]
    pub fn current() -> Self {
        let vendor = if cfg!(target_os = "android") {
            "android"
        } else if cfg!(target_vendor = "apple") {
            "apple"
        } else if cfg!(target_vendor = "pc") {
            "pc"
        } else {
            "unknown"
        };
        Self::new(vendor, std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Lower-cased vendor.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Lower-cased OS name.
    #[must_use]
    pub fn os_name(&self) -> &str {
        &self.os_name
    }

    /// Lower-cased architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Canonical OS family, if recognized.
    ///
    /// `darwin` contains `win`, so macOS is matched before Windows.
    #[must_use]
    pub fn os_family(&self) -> Option<OsFamily> {
        let os = self.os_name.as_str();
        if self.vendor.contains("android") || os.contains("android") {
            Some(OsFamily::Android)
        } else if os.contains("linux") {
            Some(OsFamily::Linux)
        } else if os.contains("darwin") || os.contains("mac") {
            Some(OsFamily::MacOs)
        } else if os.contains("win") {
            Some(OsFamily::Windows)
        } else {
            None
        }
    }

    /// Canonical architecture family, if recognized and unambiguous.
    #[must_use]
    pub fn arch_family(&self) -> Option<ArchFamily> {
        let arch = self.arch.as_str();
        let intel = arch.contains("x86_64") || arch.contains("amd64");
        let arm = arch.contains("aarch64") || arch.contains("arm64");
        match (intel, arm) {
            (true, false) => Some(ArchFamily::X86_64),
            (false, true) => Some(ArchFamily::Aarch64),
            (true, true) => {
                log::warn!("ambiguous architecture `{arch}` matches both x86_64 and aarch64");
                None
            }
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;

    #[test_case("oracle corporation", "Linux", "aarch64", Platform::LinuxArm64 ; "linux arm")]
    #[test_case("oracle corporation", "Linux", "amd64", Platform::Linux64 ; "linux amd64")]
    #[test_case("oracle corporation", "Windows 10", "amd64", Platform::Windows64 ; "windows")]
    #[test_case("apple", "Mac OS X", "aarch64", Platform::OsxArm64 ; "mac arm")]
    #[test_case("apple", "Darwin", "x86_64", Platform::Osx64 ; "darwin intel")]
    #[test_case("The Android Project", "Linux", "aarch64", Platform::AndroidArm64 ; "android vendor")]
    #[test_case("unknown", "android", "x86_64", Platform::Android64 ; "android os name")]
    fn test_resolves_supported_platforms(vendor: &str, os: &str, arch: &str, expected: Platform) {
        let facts = PlatformFacts::new(vendor, os, arch);
        assert_eq!(Platform::resolve(&facts).expect("supported"), expected);
    }

    #[test_case("oracle corporation", "Linux", "riscv64" ; "unknown arch")]
    #[test_case("oracle corporation", "FreeBSD", "amd64" ; "unknown os")]
    #[test_case("microsoft", "Windows 11", "aarch64" ; "windows arm")]
    #[test_case("oracle corporation", "Linux", "x86_64-aarch64" ; "ambiguous arch")]
    fn test_rejects_unsupported_platforms(vendor: &str, os: &str, arch: &str) {
        let facts = PlatformFacts::new(vendor, os, arch);
        let err = Platform::resolve(&facts).expect_err("unsupported");
        assert!(matches!(err, LoadError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn test_darwin_is_not_windows() {
        let facts = PlatformFacts::new("apple", "darwin", "arm64");
        assert_eq!(facts.os_family(), Some(OsFamily::MacOs));
    }

    #[test]
    fn test_every_platform_round_trips_through_its_families() {
        for platform in Platform::iter() {
            let facts = PlatformFacts::new(
                "test",
                &platform.os().to_string(),
                &platform.arch().to_string(),
            );
            assert_eq!(Platform::resolve(&facts).expect("resolves"), platform);
            assert_eq!(Platform::from_str(platform.id()).expect("parse"), platform);
        }
    }

    #[test]
    fn test_library_filenames() {
        assert_eq!(Platform::Linux64.library_filename("surrealdb"), "libsurrealdb.so");
        assert_eq!(
            Platform::OsxArm64.library_filename("surrealdb"),
            "libsurrealdb.dylib"
        );
        assert_eq!(Platform::Windows64.library_filename("surrealdb"), "surrealdb.dll");
        assert_eq!(
            Platform::AndroidArm64.resource_path("surrealdb"),
            "natives/android_arm64/libsurrealdb.so"
        );
    }
}
