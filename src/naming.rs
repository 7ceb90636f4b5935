//! Output name templating.
//!
//! An output name template may contain [`Placeholder`] tokens. The version
//! token is substituted once per run (when a tag is known); OS and
//! architecture tokens are substituted per platform by [`resolve_name`].
//!
//! When several platforms share one template, names are disambiguated by
//! appending `-<os>` and `-<arch>` for every axis whose token is missing, so
//! two distinct platforms never produce the same artifact name.

use crate::platform::{Arch, Os, Platform};
use std::fmt;

/// Token recognised in output name templates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placeholder {
    /// Replaced by the nearest git tag, when there is one
    Version,
    /// Replaced by the architecture tag (plus ARM revision)
    Arch,
    /// Replaced by the OS tag
    Os,
}

impl Placeholder {
    /// Literal token text.
    pub const fn token(&self) -> &'static str {
        match self {
            Placeholder::Version => "{Version}",
            Placeholder::Arch => "{Arch}",
            Placeholder::Os => "{OS}",
        }
    }

    /// Replace every occurrence of this token in `template`.
    pub fn substitute(&self, template: &str, value: &str) -> String {
        template.replace(self.token(), value)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Name of one platform's artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedName {
    /// Base name, used for archive file names
    pub name: String,
    /// Executable file name: `name`, plus `.exe` for Windows
    pub binary: String,
    /// The OS the name was resolved for (host OS when the platform has none)
    pub os: Os,
}

/// Resolve the artifact name for `platform`.
///
/// `skeleton` is the template with the version token already handled.
/// `disambiguate` is set whenever more than one platform is built in a run.
///
/// # Examples
///
/// ```
/// use crossbuild::naming::resolve_name;
/// use crossbuild::platform::{Arch, Os, Platform};
///
/// let win = Platform::new(Os::WINDOWS, Arch::AMD64);
/// let name = resolve_name("app", &win, true);
/// assert_eq!(name.name, "app-windows-amd64");
/// assert_eq!(name.binary, "app-windows-amd64.exe");
/// ```
pub fn resolve_name(skeleton: &str, platform: &Platform, disambiguate: bool) -> ResolvedName {
    let mut name = skeleton.to_string();

    let os = match platform.target_os() {
        Some(os) => {
            if disambiguate && !name.contains(Placeholder::Os.token()) {
                name = format!("{name}-{os}");
            }
            os.clone()
        }
        None => Os::host(),
    };
    name = Placeholder::Os.substitute(&name, os.as_str());

    let arch = match platform.arch_label() {
        Some(label) => {
            if disambiguate && !name.contains(Placeholder::Arch.token()) {
                name = format!("{name}-{label}");
            }
            label
        }
        None => Arch::host().to_string(),
    };
    name = Placeholder::Arch.substitute(&name, &arch);

    let binary = if os.is_windows() {
        format!("{name}.exe")
    } else {
        name.clone()
    };

    log::debug!("Resolved name for {platform}: {binary}");
    ResolvedName { name, binary, os }
}
