//! Disassembler: module image → structural IL-flavored listing.
//!
//! The listing is the comparison medium for cross-backend verification.
//! It is deterministic on semantic content — method, property, and event
//! blocks print in name order — while deliberately *preserving* the regions
//! where backends legitimately disagree and the normalizer does its work:
//! field lines and assembly-attribute lines print in image table order, and
//! property/event accessor lines print in recorded accessor order.
//!
//! One volatile line is emitted (the per-emission MVID comment) so that
//! comparison flows exercise volatile-line stripping the way they would
//! against a real disassembler.

mod listing;

pub use listing::Listing;

use cil_image::{
    AccessorKind, ImageEvent, ImageMethod, ImageProperty, ImageType, MethodBody, MethodFlags,
    MethodToken, ModuleImage, Op, TypeFlags, TypeSig,
};

/// Render a whole image.
pub fn disassemble(image: &ModuleImage) -> String {
    let mut out = Listing::new();
    out.line(&format!("// Module: {}", image.module_name));
    out.line(&format!("// MVID: {{{}}}", image.mvid));
    out.blank();
    out.line(&format!(".assembly {}", image.assembly_name));
    out.open();
    let [major, minor, build, revision] = image.version;
    out.line(&format!(".ver {major}:{minor}:{build}:{revision}"));
    out.close();
    out.line(&format!(".module {}", image.module_name));
    out.line(&format!(".subsystem {}", image.kind.label()));
    if let Some(arch) = &image.architecture {
        out.line(&format!(".corflags {arch}"));
    }
    for attr in &image.attributes {
        let args: Vec<String> = attr.args.iter().map(cil_image::AttrValue::render).collect();
        out.line(&format!(
            ".custom instance void {}::.ctor() = ( {} )",
            attr.name,
            args.join(", ")
        ));
    }
    for res in &image.resources {
        out.line(&format!(".mresource public {}", res.name));
        out.open();
        out.line(&format!(".size {}", res.data.len()));
        out.close();
    }
    for (type_index, ty) in image.types.iter().enumerate() {
        out.blank();
        render_type(&mut out, ty, type_index as u32, image.entry_point);
    }
    out.finish()
}

fn type_header(ty: &ImageType) -> String {
    let mut words = vec![".class"];
    if ty.flags.contains(TypeFlags::PUBLIC) {
        words.push("public");
    }
    if ty.flags.contains(TypeFlags::INTERFACE) {
        words.push("interface");
    }
    if ty.flags.contains(TypeFlags::ABSTRACT) {
        words.push("abstract");
    }
    if ty.flags.contains(TypeFlags::SEALED) {
        words.push("sealed");
    }
    if ty.flags.contains(TypeFlags::SEQUENTIAL_LAYOUT) {
        words.push("sequential");
    } else {
        words.push("auto");
    }
    if ty.flags.contains(TypeFlags::BEFORE_FIELD_INIT) {
        words.push("beforefieldinit");
    }
    let full = ty.full_name();
    format!("{} {}", words.join(" "), full)
}

fn render_type(out: &mut Listing, ty: &ImageType, type_index: u32, entry: Option<MethodToken>) {
    out.line(&type_header(ty));
    if let Some(base) = &ty.base {
        out.line(&format!("       extends {}", base.full_name));
    }
    out.open();
    for field in &ty.fields {
        let mut words = vec![".field".to_string()];
        let f = field.flags;
        if f.contains(cil_image::FieldFlags::PUBLIC) {
            words.push("public".to_string());
        }
        if f.contains(cil_image::FieldFlags::PRIVATE) {
            words.push("private".to_string());
        }
        if f.contains(cil_image::FieldFlags::STATIC) {
            words.push("static".to_string());
        }
        if f.contains(cil_image::FieldFlags::LITERAL) {
            words.push("literal".to_string());
        }
        if f.contains(cil_image::FieldFlags::SPECIAL_NAME) {
            words.push("specialname".to_string());
        }
        if f.contains(cil_image::FieldFlags::RT_SPECIAL_NAME) {
            words.push("rtspecialname".to_string());
        }
        words.push(sig_text(&field.sig));
        words.push(format!("'{}'", field.name));
        if let Some(value) = field.literal {
            words.push(format!("= int32({value})"));
        }
        out.line(&words.join(" "));
    }

    // Method blocks print in (name, arity) order: table order is a backend
    // artifact, and the normalizer's scope is line-shaped regions only.
    let mut order: Vec<usize> = (0..ty.methods.len()).collect();
    order.sort_by_key(|&i| (ty.methods[i].name.clone(), ty.methods[i].params.len()));
    for index in order {
        let is_entry = entry.is_some_and(|t| {
            t.type_index == type_index && t.method_index as usize == index
        });
        render_method(out, ty, &ty.methods[index], is_entry);
    }

    let mut props: Vec<&ImageProperty> = ty.properties.iter().collect();
    props.sort_by_key(|p| p.name.clone());
    for prop in props {
        render_property(out, ty, prop);
    }

    let mut events: Vec<&ImageEvent> = ty.events.iter().collect();
    events.sort_by_key(|e| e.name.clone());
    for event in events {
        render_event(out, ty, event);
    }
    out.close();
}

fn render_method(out: &mut Listing, ty: &ImageType, method: &ImageMethod, is_entry: bool) {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| format!("{} {}", sig_text(&p.sig), p.name))
        .collect();
    let mut words = vec![".method".to_string()];
    let f = method.flags;
    if f.contains(MethodFlags::PUBLIC) {
        words.push("public".to_string());
    }
    if f.contains(MethodFlags::HIDE_BY_SIG) {
        words.push("hidebysig".to_string());
    }
    if f.contains(MethodFlags::SPECIAL_NAME) {
        words.push("specialname".to_string());
    }
    if f.contains(MethodFlags::RT_SPECIAL_NAME) {
        words.push("rtspecialname".to_string());
    }
    if f.contains(MethodFlags::NEW_SLOT) {
        words.push("newslot".to_string());
    }
    if f.contains(MethodFlags::ABSTRACT) {
        words.push("abstract".to_string());
    }
    if f.contains(MethodFlags::VIRTUAL) {
        words.push("virtual".to_string());
    }
    words.push("instance".to_string());
    words.push(sig_text(&method.ret));
    words.push(format!("{}({})", method.name, params.join(", ")));
    match &method.body {
        MethodBody::Abstract => {
            out.line(&format!("{} cil managed", words.join(" ")));
            out.open();
            out.close();
        }
        MethodBody::Runtime => {
            out.line(&format!("{} runtime managed", words.join(" ")));
            out.open();
            out.close();
        }
        MethodBody::Il { locals, ops } => {
            out.line(&format!("{} cil managed", words.join(" ")));
            out.open();
            if is_entry {
                out.line(".entrypoint");
            }
            if !locals.is_empty() {
                let slots: Vec<String> = locals.iter().map(sig_text).collect();
                out.line(&format!(".locals init ({})", slots.join(", ")));
            }
            for op in ops {
                render_op(out, ty, op);
            }
            out.close();
        }
    }
}

fn render_op(out: &mut Listing, ty: &ImageType, op: &Op) {
    let text = match op {
        Op::LdArg(n) => format!("ldarg.{n}"),
        Op::LdFld(f) => format!("ldfld {}", field_ref(ty, *f)),
        Op::LdFldA(f) => format!("ldflda {}", field_ref(ty, *f)),
        Op::StFld(f) => format!("stfld {}", field_ref(ty, *f)),
        Op::LdLoc(n) => format!("ldloc.{n}"),
        Op::StLoc(n) => format!("stloc.{n}"),
        Op::Call(c) => format!("call {}", c.full_name()),
        Op::CallBase => "call instance void base::.ctor()".to_string(),
        Op::CastClass(sig) => format!("castclass {}", sig_text(sig)),
        Op::Label(n) => format!("IL_{n:02}:"),
        Op::BneUn(n) => format!("bne.un IL_{n:02}"),
        Op::Ret => "ret".to_string(),
    };
    out.line(&text);
}

fn field_ref(ty: &ImageType, index: u16) -> String {
    match ty.fields.get(index as usize) {
        Some(field) => format!(
            "{} {}::'{}'",
            sig_text(&field.sig),
            ty.full_name(),
            field.name
        ),
        None => format!("<bad-field-{index}>"),
    }
}

fn render_property(out: &mut Listing, ty: &ImageType, prop: &ImageProperty) {
    let params: Vec<String> = prop.params.iter().map(|p| sig_text(&p.sig)).collect();
    out.line(&format!(
        ".property instance {} {}({})",
        sig_text(&prop.sig),
        prop.name,
        params.join(", ")
    ));
    out.open();
    for acc in &prop.accessors {
        let method = &ty.methods[acc.method as usize];
        let line = match acc.kind {
            AccessorKind::Get => format!(
                ".get instance {} {}::{}()",
                sig_text(&method.ret),
                ty.full_name(),
                method.name
            ),
            AccessorKind::Set => format!(
                ".set instance void {}::{}({})",
                ty.full_name(),
                method.name,
                method
                    .params
                    .iter()
                    .map(|p| sig_text(&p.sig))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            AccessorKind::Add | AccessorKind::Remove => continue,
        };
        out.line(&line);
    }
    out.close();
}

fn render_event(out: &mut Listing, ty: &ImageType, event: &ImageEvent) {
    out.line(&format!(
        ".event {} {}",
        sig_text(&event.handler),
        event.name
    ));
    out.open();
    for acc in &event.accessors {
        let method = &ty.methods[acc.method as usize];
        let verb = match acc.kind {
            AccessorKind::Add => ".addon",
            AccessorKind::Remove => ".removeon",
            AccessorKind::Get | AccessorKind::Set => continue,
        };
        out.line(&format!(
            "{verb} instance void {}::{}({})",
            ty.full_name(),
            method.name,
            sig_text(&event.handler)
        ));
    }
    out.close();
}

/// Textual form of a signature, listing-flavored.
fn sig_text(sig: &TypeSig) -> String {
    match sig {
        TypeSig::Void => "void".to_string(),
        TypeSig::Int32 => "int32".to_string(),
        TypeSig::String => "string".to_string(),
        TypeSig::Object => "object".to_string(),
        TypeSig::NativeInt => "native int".to_string(),
        TypeSig::Handler => "class System.EventHandler".to_string(),
        TypeSig::AsyncCallback => "class System.AsyncCallback".to_string(),
        TypeSig::AsyncResult => "class System.IAsyncResult".to_string(),
        TypeSig::StringMap => {
            "class System.Collections.Generic.Dictionary`2<int32,string>".to_string()
        }
        TypeSig::Named(name) => format!("class {name}"),
    }
}
