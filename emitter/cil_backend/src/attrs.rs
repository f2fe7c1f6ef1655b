//! Shared assembly-attribute constructors.
//!
//! Every backend stamps the same attribute set with the same values — only
//! the stamping order is backend-specific. Values all come from the model's
//! derivation helpers, so they cannot drift between strategies.

use cil_image::{AttrValue, ImageAttribute};
use cil_model::AssemblyDef;

fn str_attr(name: &str, value: String) -> ImageAttribute {
    ImageAttribute::new(name, vec![AttrValue::Str(value)])
}

/// `AssemblyCompanyAttribute`.
pub fn company(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyCompanyAttribute",
        ass.manifest.company().to_string(),
    )
}

/// `AssemblyConfigurationAttribute`.
pub fn configuration(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyConfigurationAttribute",
        ass.manifest.configuration().to_string(),
    )
}

/// `AssemblyCopyrightAttribute`.
pub fn copyright(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyCopyrightAttribute",
        ass.manifest.copyright(),
    )
}

/// `AssemblyDescriptionAttribute`.
pub fn description(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyDescriptionAttribute",
        ass.manifest.description().to_string(),
    )
}

/// `AssemblyFileVersionAttribute`.
pub fn file_version(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyFileVersionAttribute",
        ass.file_version(),
    )
}

/// `AssemblyProductAttribute`.
pub fn product(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyProductAttribute",
        ass.manifest.product().to_string(),
    )
}

/// `AssemblyTitleAttribute`.
pub fn title(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyTitleAttribute",
        ass.manifest.title().to_string(),
    )
}

/// `AssemblyTrademarkAttribute`.
pub fn trademark(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Reflection.AssemblyTrademarkAttribute",
        ass.manifest.trademark().to_string(),
    )
}

/// `CompilationRelaxationsAttribute`.
pub fn relaxations(ass: &AssemblyDef) -> ImageAttribute {
    ImageAttribute::new(
        "System.Runtime.CompilerServices.CompilationRelaxationsAttribute",
        vec![AttrValue::Int(i64::from(ass.manifest.relaxations()))],
    )
}

/// `RuntimeCompatibilityAttribute` with the wrap flag as a named argument.
pub fn runtime_compatibility(ass: &AssemblyDef) -> ImageAttribute {
    ImageAttribute::new(
        "System.Runtime.CompilerServices.RuntimeCompatibilityAttribute",
        vec![AttrValue::Named(
            "WrapNonExceptionThrows".to_string(),
            Box::new(AttrValue::Bool(ass.manifest.wrap_non_exception_throws())),
        )],
    )
}

/// `ComVisibleAttribute`.
pub fn com_visible(ass: &AssemblyDef) -> ImageAttribute {
    ImageAttribute::new(
        "System.Runtime.InteropServices.ComVisibleAttribute",
        vec![AttrValue::Bool(ass.manifest.com_visible)],
    )
}

/// `GuidAttribute`. Generated per call when the manifest pins none.
pub fn guid(ass: &AssemblyDef) -> ImageAttribute {
    str_attr(
        "System.Runtime.InteropServices.GuidAttribute",
        ass.manifest.guid().to_string(),
    )
}

/// `TargetFrameworkAttribute` with the display name as a named argument.
pub fn target_framework(ass: &AssemblyDef) -> ImageAttribute {
    ImageAttribute::new(
        "System.Runtime.Versioning.TargetFrameworkAttribute",
        vec![
            AttrValue::Str(ass.manifest.framework_label()),
            AttrValue::Named(
                "FrameworkDisplayName".to_string(),
                Box::new(AttrValue::Str(ass.manifest.framework_display_name())),
            ),
        ],
    )
}
