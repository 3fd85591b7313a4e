use std::fmt;

/// Host operating system family, as far as script validation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Solaris and illumos.
    SunOs,
    /// Linux, the BSDs and other Unix-like systems with a POSIX shell.
    UnixLike,
    Other(String),
}

impl Platform {
    /// Platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Classify an OS name as reported by `std::env::consts::OS`.
    ///
    /// ```rust
    /// use taskexec_validation::Platform;
    ///
    /// assert_eq!(Platform::from_os_name("linux"), Platform::UnixLike);
    /// assert_eq!(Platform::from_os_name("macos"), Platform::MacOs);
    /// ```
    #[must_use]
    pub fn from_os_name(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "windows" => Self::Windows,
            "macos" | "ios" => Self::MacOs,
            "solaris" | "illumos" => Self::SunOs,
            "linux" | "android" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "haiku"
            | "aix" | "hurd" => Self::UnixLike,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub const fn supports_validation(&self) -> bool {
        matches!(self, Self::UnixLike)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("Windows"),
            Self::MacOs => f.write_str("Mac"),
            Self::SunOs => f.write_str("SunOS"),
            Self::UnixLike => f.write_str("Unix-like"),
            Self::Other(name) => f.write_str(name),
        }
    }
}
