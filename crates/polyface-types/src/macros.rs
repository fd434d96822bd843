macro_rules! builtin_types {
    (
        reference_types: {
            $( $ref_variant:ident => $ref_name:literal extends $parent:expr ),* $(,)?
        },
        primitive_types: {
            $(
                $prim_variant:ident => $prim_name:literal as $kind:ident boxed $wrapper:ident
            ),* $(,)?
        }
    ) => {
        /// Types every [`TypeUniverse`](crate::TypeUniverse) registers before any user type.
        /// Each variant's discriminant is its [`TypeDescription`] index.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(u32)]
        pub enum Builtin {
            $( $ref_variant, )*
            $( $prim_variant, )*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[
                $( Builtin::$ref_variant, )*
                $( Builtin::$prim_variant, )*
            ];

            pub const fn ty(self) -> TypeDescription {
                TypeDescription(self as u32)
            }

            pub fn from_type(ty: TypeDescription) -> Option<Self> {
                Self::ALL.get(ty.index()).copied()
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Builtin::$ref_variant => $ref_name, )*
                    $( Builtin::$prim_variant => $prim_name, )*
                }
            }

            pub fn namespace(self) -> &'static str {
                match self.primitive_kind() {
                    Some(_) => "",
                    None => BUILTIN_NAMESPACE,
                }
            }

            pub fn superclass(self) -> Option<Builtin> {
                match self {
                    $( Builtin::$ref_variant => $parent, )*
                    $( Builtin::$prim_variant => None, )*
                }
            }

            pub fn primitive_kind(self) -> Option<PrimitiveKind> {
                match self {
                    $( Builtin::$prim_variant => Some(PrimitiveKind::$kind), )*
                    _ => None,
                }
            }
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum PrimitiveKind {
            $( $kind, )*
        }

        impl PrimitiveKind {
            pub fn builtin(self) -> Builtin {
                match self {
                    $( PrimitiveKind::$kind => Builtin::$prim_variant, )*
                }
            }

            /// The reference type a value of this primitive is boxed into.
            pub fn wrapper(self) -> Builtin {
                match self {
                    $( PrimitiveKind::$kind => Builtin::$wrapper, )*
                }
            }
        }
    };
}
