//! Declaration source generation.
//!
//! Renders the model as declaration-level source in the subset dialect.
//! Attribute values are produced by the shared constructors in
//! `cil_backend::attrs`, so the stamped values cannot drift from the other
//! strategies; only the textual order here is this backend's own.

use cil_backend::{attrs, EmitError, TypeResolver};
use cil_image::{AttrValue, ImageAttribute};
use cil_model::{AssemblyDef, FlatNamespace, MemberDef, MemberKind, TypeDef, TypeKind};

use crate::dialect;

/// Render the whole compilation unit.
pub fn generate(ass: &AssemblyDef, resolver: &dyn TypeResolver) -> Result<String, EmitError> {
    // Surface a malformed version here, before any source exists.
    let version = ass.parsed_version()?;
    let mut out = String::new();
    out.push_str("using System;\n");
    out.push_str("using System.Reflection;\n");
    out.push_str("using System.Runtime.CompilerServices;\n");
    out.push_str("using System.Runtime.InteropServices;\n");
    out.push_str("using System.Runtime.Versioning;\n\n");

    push_attr_line(
        &mut out,
        &ImageAttribute::new(
            "AssemblyVersion",
            vec![AttrValue::Str(version.to_string())],
        ),
        true,
    );
    for attr in [
        attrs::company(ass),
        attrs::configuration(ass),
        attrs::copyright(ass),
        attrs::description(ass),
        attrs::file_version(ass),
        attrs::product(ass),
        attrs::title(ass),
        attrs::trademark(ass),
        attrs::com_visible(ass),
        attrs::relaxations(ass),
        attrs::guid(ass),
        attrs::runtime_compatibility(ass),
        attrs::target_framework(ass),
    ] {
        push_attr_line(&mut out, &attr, false);
    }
    out.push('\n');

    for nsp in ass.flat_namespaces() {
        generate_namespace(&mut out, &nsp, resolver)?;
    }
    Ok(out)
}

fn push_attr_line(out: &mut String, attr: &ImageAttribute, short_already: bool) {
    let name = if short_already {
        attr.name.clone()
    } else {
        // The table covers every attribute the shared constructors produce.
        dialect::short_name(&attr.name)
            .map(str::to_string)
            .unwrap_or_else(|| attr.name.clone())
    };
    let args: Vec<String> = attr.args.iter().map(AttrValue::render).collect();
    out.push_str(&format!("[assembly: {name}({})]\n", args.join(", ")));
}

fn generate_namespace(
    out: &mut String,
    nsp: &FlatNamespace<'_>,
    resolver: &dyn TypeResolver,
) -> Result<(), EmitError> {
    out.push_str(&format!("namespace {}\n{{\n", nsp.name));
    for ty in nsp.types {
        generate_type(out, ty, resolver)?;
    }
    out.push_str("}\n");
    Ok(())
}

fn generate_type(
    out: &mut String,
    ty: &TypeDef,
    resolver: &dyn TypeResolver,
) -> Result<(), EmitError> {
    match &ty.kind {
        TypeKind::Enum => {
            out.push_str(&format!("    public enum {}\n    {{\n", ty.name));
            for member in ty.members.iter().filter(|m| m.kind == MemberKind::Constant) {
                out.push_str(&format!("        {},\n", member.name));
            }
            out.push_str("    }\n");
        }
        TypeKind::Delegate => {
            out.push_str(&format!("    public delegate void {}();\n", ty.name));
        }
        TypeKind::Struct => {
            let head = if ty.is_abstract {
                "public abstract struct"
            } else {
                "public struct"
            };
            out.push_str(&format!("    {head} {}\n    {{\n", ty.name));
            generate_members(out, ty);
            out.push_str("    }\n");
        }
        TypeKind::Interface => {
            out.push_str(&format!("    public interface {}\n    {{\n", ty.name));
            generate_members(out, ty);
            out.push_str("    }\n");
        }
        TypeKind::Class { base } => {
            let head = if ty.is_abstract {
                "public abstract class"
            } else {
                "public class"
            };
            match base.as_deref() {
                Some(name) => {
                    let resolved = resolver.resolve(name)?;
                    out.push_str(&format!(
                        "    {head} {} : {}\n    {{\n",
                        ty.name, resolved.full_name
                    ));
                }
                None => out.push_str(&format!("    {head} {}\n    {{\n", ty.name)),
            }
            generate_members(out, ty);
            out.push_str("    }\n");
        }
    }
    Ok(())
}

fn generate_members(out: &mut String, ty: &TypeDef) {
    let abstract_owner = ty.is_abstract_owner();
    let interface = ty.kind == TypeKind::Interface;
    for member in &ty.members {
        generate_member(out, member, abstract_owner, interface);
    }
}

fn generate_member(out: &mut String, member: &MemberDef, abstract_owner: bool, interface: bool) {
    // Interface members carry no modifiers; abstract class/struct members
    // say so; concrete members are plain public.
    let mods = if interface {
        ""
    } else if abstract_owner {
        "public abstract "
    } else {
        "public "
    };
    match member.kind {
        MemberKind::Method => {
            if abstract_owner {
                out.push_str(&format!("        {mods}void {}();\n", member.name));
            } else {
                out.push_str(&format!("        {mods}void {}() {{ }}\n", member.name));
            }
        }
        MemberKind::Property => {
            out.push_str(&format!(
                "        {mods}string {} {{ get; set; }}\n",
                member.name
            ));
        }
        MemberKind::Indexer => {
            out.push_str(&format!(
                "        {mods}string {}[int index] {{ get; set; }}\n",
                member.name
            ));
        }
        MemberKind::Event => {
            out.push_str(&format!("        {mods}event EventHandler {};\n", member.name));
        }
        MemberKind::Constant => {
            // Constants only take a shape on concrete owners.
            if !abstract_owner {
                out.push_str(&format!("        {mods}object {};\n", member.name));
            }
        }
        // No shape for these kinds; carried in the taxonomy only.
        MemberKind::Constructor | MemberKind::Field | MemberKind::Operator => {}
    }
}
