//! Surface-syntax rendering of types.
//!
//! Output forms: primitive keywords, `array[char]`, `(int, int) -> bool`,
//! `class Foo<T> : Bar<T>` for a class at the root of a render and
//! `class Name<args>` for a class reached from inside another type.
//! Parent lists use the bare form `Name<args>`.
//!
//! A mono renders its template with the template's typenames substituted
//! by the rendered arguments. Substitutions live in a stack of frames that
//! belongs to a single render call, so sibling renders never see each
//! other's bindings. Arguments are rendered before their frame is pushed,
//! which keeps a substitution from ever expanding into itself.

use std::fmt;

use rustc_hash::FxHashMap;
use vex_ir::Name;

use crate::{Type, TypeId, TypeKind, TypeTable};

const ERROR: &str = "<error>";

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Mode {
    /// Outermost node: classes show their parents.
    Root,
    /// Inside another type: `class Name<args>`.
    Nested,
    /// Entry of a parent list: `Name<args>`.
    Bare,
}

type Frame = FxHashMap<(TypeId, Name), String>;

struct Renderer<'t> {
    table: &'t TypeTable,
    frames: Vec<Frame>,
    out: String,
}

impl Renderer<'_> {
    fn render(&mut self, ty: &Type, mode: Mode) {
        vex_stack::ensure_sufficient_stack(|| match ty.kind() {
            TypeKind::Primitive(p) => self.out.push_str(p.keyword()),
            TypeKind::Array { elem } => {
                self.out.push_str("array[");
                self.render(elem, Mode::Nested);
                self.out.push(']');
            }
            TypeKind::Callable { ret, params } => {
                self.out.push('(');
                self.list(params);
                self.out.push_str(") -> ");
                self.render(ret, Mode::Nested);
            }
            TypeKind::ClassTemplate {
                name,
                typenames,
                parents,
            } => {
                if mode != Mode::Bare {
                    self.out.push_str("class ");
                }
                self.out.push_str(self.table.name(*name));
                if let Some(list) = typenames.as_deref().filter(|l| !l.is_empty()) {
                    self.out.push('<');
                    self.list(list);
                    self.out.push('>');
                }
                if mode == Mode::Root && !parents.is_empty() {
                    self.out.push_str(" : ");
                    for (i, &parent) in parents.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.render_ref(parent, Mode::Bare);
                    }
                }
            }
            TypeKind::Typename { name, source } => {
                let bound = self
                    .frames
                    .iter()
                    .rev()
                    .find_map(|frame| frame.get(&(*source, *name)));
                let text = bound.map_or_else(|| self.table.name(*name), String::as_str);
                self.out.push_str(text);
            }
            TypeKind::Mono { template, args } => self.mono(*template, args, mode),
        });
    }

    fn mono(&mut self, template: TypeId, args: &[Type], mode: Mode) {
        let table = self.table;
        let Some(TypeKind::ClassTemplate { typenames, .. }) = table.try_get(template).map(Type::kind)
        else {
            self.out.push_str(ERROR);
            return;
        };

        let mut frame = Frame::default();
        for (param, arg) in typenames.iter().flatten().zip(args) {
            if let TypeKind::Typename { name, .. } = param.kind() {
                let text = self.detached(arg);
                frame.insert((template, *name), text);
            }
        }

        self.frames.push(frame);
        let template_mode = if mode == Mode::Bare {
            Mode::Bare
        } else {
            Mode::Nested
        };
        self.render_ref(template, template_mode);
        self.frames.pop();
    }

    /// Render into a fresh buffer under the current frames.
    fn detached(&mut self, ty: &Type) -> String {
        let saved = std::mem::take(&mut self.out);
        self.render(ty, Mode::Nested);
        std::mem::replace(&mut self.out, saved)
    }

    fn render_ref(&mut self, id: TypeId, mode: Mode) {
        match self.table.try_get(id) {
            Some(ty) => self.render(ty, mode),
            None => self.out.push_str(ERROR),
        }
    }

    fn list(&mut self, items: &[Type]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.render(item, Mode::Nested);
        }
    }
}

impl TypeTable {
    /// Render a type in surface syntax.
    pub fn render(&self, ty: &Type) -> String {
        let mut renderer = Renderer {
            table: self,
            frames: Vec::new(),
            out: String::new(),
        };
        renderer.render(ty, Mode::Root);
        renderer.out
    }

    /// [`render`](Self::render) for an interned handle; `<error>` for a
    /// handle that does not belong to this table.
    pub fn render_id(&self, id: TypeId) -> String {
        self.try_get(id)
            .map_or_else(|| ERROR.to_owned(), |ty| self.render(ty))
    }

    /// `Display` adapter, for use in format strings and log fields.
    pub fn display<'a>(&'a self, ty: &'a Type) -> TypeDisplay<'a> {
        TypeDisplay { table: self, ty }
    }
}

/// Displays a type through its table. See [`TypeTable::display`].
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    ty: &'a Type,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table.render(self.ty))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
