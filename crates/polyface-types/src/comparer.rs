use crate::{runtime::RuntimeType, Builtin, TypeUniverse};

pub struct TypeComparer<'a> {
    universe: &'a TypeUniverse,
}

impl<'a> TypeComparer<'a> {
    pub fn new(universe: &'a TypeUniverse) -> Self {
        Self { universe }
    }

    pub fn universe(&self) -> &'a TypeUniverse {
        self.universe
    }

    /// Whether a value of type `source` may be stored where `target` is expected.
    /// Primitives are only assignable to themselves; arrays are covariant over
    /// reference components.
    pub fn is_assignable(&self, target: &RuntimeType, source: &RuntimeType) -> bool {
        match (target, source) {
            (RuntimeType::Type(t), RuntimeType::Type(s)) => {
                if t == s {
                    return true;
                }
                if t.is_primitive() || s.is_primitive() {
                    return false;
                }
                *t == Builtin::Object.ty() || self.universe.is_a(*s, *t)
            }
            (RuntimeType::Type(t), RuntimeType::Array(_)) => *t == Builtin::Object.ty(),
            (RuntimeType::Array(_), RuntimeType::Type(_)) => false,
            (RuntimeType::Array(tc), RuntimeType::Array(sc)) => {
                if tc.is_primitive() || sc.is_primitive() {
                    tc == sc
                } else {
                    self.is_assignable(tc, sc)
                }
            }
        }
    }

    pub fn is_assignable_either_way(&self, a: &RuntimeType, b: &RuntimeType) -> bool {
        self.is_assignable(a, b) || self.is_assignable(b, a)
    }

    /// `sub` is assignable to `sup` and the two differ.
    pub fn is_strict_subtype(&self, sub: &RuntimeType, sup: &RuntimeType) -> bool {
        sub != sup && self.is_assignable(sup, sub)
    }

    /// Maps a primitive to its wrapper; any other type is returned as is.
    pub fn boxed(&self, ty: &RuntimeType) -> RuntimeType {
        match ty.primitive_kind() {
            Some(kind) => kind.wrapper().into(),
            None => ty.clone(),
        }
    }

    /// Assignability after boxing both sides.
    pub fn is_boxed_assignable(&self, target: &RuntimeType, source: &RuntimeType) -> bool {
        self.is_assignable(&self.boxed(target), &self.boxed(source))
    }
}
