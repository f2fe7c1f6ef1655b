//! Assembly manifest metadata.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use uuid::Uuid;

/// Target processor architecture.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Architecture {
    I386,
    Amd64,
    Arm,
    AnyCpu,
}

impl Architecture {
    /// Label stamped into the artifact.
    pub fn label(self) -> &'static str {
        match self {
            Architecture::I386 => "I386",
            Architecture::Amd64 => "AMD64",
            Architecture::Arm => "ARM",
            Architecture::AnyCpu => "AnyCPU",
        }
    }
}

impl FromStr for Architecture {
    type Err = ();

    /// Case-insensitive parse; unknown labels are simply absent, matching
    /// the try-parse-or-skip handling at the emission sites.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "i386" | "x86" => Ok(Architecture::I386),
            "amd64" | "x64" => Ok(Architecture::Amd64),
            "arm" => Ok(Architecture::Arm),
            "anycpu" => Ok(Architecture::AnyCpu),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive assembly metadata.
///
/// Created with the assembly and treated as immutable once emission begins.
/// Optional fields have effective defaults computed by the derivation
/// helpers below; every backend must use those helpers so the stamped values
/// agree across backends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManifestDef {
    pub company: Option<String>,
    pub product: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub copyright: Option<String>,
    pub trademark: Option<String>,
    pub file_version: Option<String>,
    pub configuration: Option<String>,
    pub framework: Option<String>,
    pub com_visible: bool,
    pub guid: Option<Uuid>,
    /// Require string-literal interning in the generated module.
    pub string_interning: bool,
    /// Opt out of wrapping non-exception throwables.
    pub dont_wrap_non_exceptions: bool,
    /// `Namespace.Type.Method` path of the entry point, when the module is
    /// executable and one is known.
    pub entry_point: Option<String>,
    pub architecture: Option<Architecture>,
}

impl ManifestDef {
    /// Effective company string (empty when unset).
    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    /// Effective product string (empty when unset).
    pub fn product(&self) -> &str {
        self.product.as_deref().unwrap_or("")
    }

    /// Effective title string (empty when unset).
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Effective description string (empty when unset).
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Effective trademark string (empty when unset).
    pub fn trademark(&self) -> &str {
        self.trademark.as_deref().unwrap_or("")
    }

    /// Effective configuration string (empty when unset).
    pub fn configuration(&self) -> &str {
        self.configuration.as_deref().unwrap_or("")
    }

    /// Effective copyright: the explicit value, or
    /// `Copyright © {company} {currentYear}`.
    pub fn copyright(&self) -> String {
        match &self.copyright {
            Some(c) => c.clone(),
            None => {
                let year = chrono::Utc::now().year();
                format!("Copyright © {} {}", self.company(), year)
            }
        }
    }

    /// Effective target framework version, `"4.5"` when unset.
    pub fn framework(&self) -> &str {
        self.framework.as_deref().unwrap_or("4.5")
    }

    /// Framework identity label, e.g. `.NETFramework,Version=v4.5`.
    pub fn framework_label(&self) -> String {
        format!(".NETFramework,Version=v{}", self.framework())
    }

    /// Framework display name, e.g. `.NET Framework 4.5`.
    pub fn framework_display_name(&self) -> String {
        format!(".NET Framework {}", self.framework())
    }

    /// Manifest GUID: the explicit value, or a freshly generated one.
    ///
    /// Absent GUIDs are generated per call, so two backends emitting the
    /// same GUID-less model stamp different values. Comparison flows pin the
    /// GUID in the model.
    pub fn guid(&self) -> Uuid {
        self.guid.unwrap_or_else(Uuid::new_v4)
    }

    /// Compilation-relaxations mask: 8 (interning not required) unless
    /// string interning is demanded.
    pub fn relaxations(&self) -> i32 {
        if self.string_interning {
            0
        } else {
            8
        }
    }

    /// Whether non-exception throwables are wrapped at runtime.
    pub fn wrap_non_exception_throws(&self) -> bool {
        !self.dont_wrap_non_exceptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_copyright_default_mentions_company_and_year() {
        let m = ManifestDef {
            company: Some("Initech".to_string()),
            ..ManifestDef::default()
        };
        let year = chrono::Utc::now().year().to_string();
        let c = m.copyright();
        assert!(c.starts_with("Copyright © Initech"));
        assert!(c.ends_with(&year));
    }

    #[test]
    fn test_explicit_copyright_wins() {
        let m = ManifestDef {
            copyright: Some("(c) someone".to_string()),
            ..ManifestDef::default()
        };
        assert_eq!(m.copyright(), "(c) someone");
    }

    #[test]
    fn test_framework_labels() {
        let m = ManifestDef::default();
        assert_eq!(m.framework(), "4.5");
        assert_eq!(m.framework_label(), ".NETFramework,Version=v4.5");
        assert_eq!(m.framework_display_name(), ".NET Framework 4.5");
    }

    #[test]
    fn test_relaxations() {
        let mut m = ManifestDef::default();
        assert_eq!(m.relaxations(), 8);
        m.string_interning = true;
        assert_eq!(m.relaxations(), 0);
    }

    #[test]
    fn test_pinned_guid_is_stable() {
        let id = Uuid::new_v4();
        let m = ManifestDef {
            guid: Some(id),
            ..ManifestDef::default()
        };
        assert_eq!(m.guid(), id);
        assert_eq!(m.guid(), id);
    }

    #[test]
    fn test_architecture_parse() {
        assert_eq!("amd64".parse::<Architecture>(), Ok(Architecture::Amd64));
        assert_eq!("X86".parse::<Architecture>(), Ok(Architecture::I386));
        assert!("mips".parse::<Architecture>().is_err());
    }
}
