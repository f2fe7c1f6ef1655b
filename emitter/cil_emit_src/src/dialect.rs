//! The declaration dialect shared by generator and compiler.
//!
//! Attribute names travel short in source (`AssemblyCompany`) and full in
//! the image (`System.Reflection.AssemblyCompanyAttribute`); this table is
//! the single mapping both sides use.

/// (full image name, short source name) pairs for assembly attributes.
pub const ATTRIBUTE_NAMES: &[(&str, &str)] = &[
    ("System.Reflection.AssemblyCompanyAttribute", "AssemblyCompany"),
    (
        "System.Reflection.AssemblyConfigurationAttribute",
        "AssemblyConfiguration",
    ),
    (
        "System.Reflection.AssemblyCopyrightAttribute",
        "AssemblyCopyright",
    ),
    (
        "System.Reflection.AssemblyDescriptionAttribute",
        "AssemblyDescription",
    ),
    (
        "System.Reflection.AssemblyFileVersionAttribute",
        "AssemblyFileVersion",
    ),
    ("System.Reflection.AssemblyProductAttribute", "AssemblyProduct"),
    ("System.Reflection.AssemblyTitleAttribute", "AssemblyTitle"),
    (
        "System.Reflection.AssemblyTrademarkAttribute",
        "AssemblyTrademark",
    ),
    (
        "System.Runtime.CompilerServices.CompilationRelaxationsAttribute",
        "CompilationRelaxations",
    ),
    (
        "System.Runtime.CompilerServices.RuntimeCompatibilityAttribute",
        "RuntimeCompatibility",
    ),
    (
        "System.Runtime.InteropServices.ComVisibleAttribute",
        "ComVisible",
    ),
    ("System.Runtime.InteropServices.GuidAttribute", "Guid"),
    (
        "System.Runtime.Versioning.TargetFrameworkAttribute",
        "TargetFramework",
    ),
];

/// Short source name for a full attribute name.
pub fn short_name(full: &str) -> Option<&'static str> {
    ATTRIBUTE_NAMES
        .iter()
        .find(|(f, _)| *f == full)
        .map(|(_, s)| *s)
}

/// Full attribute name for a short source name.
pub fn full_name(short: &str) -> Option<&'static str> {
    ATTRIBUTE_NAMES
        .iter()
        .find(|(_, s)| *s == short)
        .map(|(f, _)| *f)
}
