use crate::{error::InvocationError, runtime::RuntimeType, Builtin, TypeDescription};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// A host value as seen by dispatch. Primitive payloads are carried boxed, so a
/// `Value::Int` reports `core.Integer` as its runtime type.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
}

#[derive(Clone)]
pub struct ObjectRef {
    ty: TypeDescription,
    payload: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(ty: TypeDescription, payload: T) -> Self {
        Self {
            ty,
            payload: Arc::new(payload),
        }
    }

    pub fn ty(&self) -> TypeDescription {
        self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }

    /// Address of the shared payload; stable for the lifetime of the object.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.payload) as *const () as usize
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectRef({:?} @ {:p})", self.ty, Arc::as_ptr(&self.payload))
    }
}

#[derive(Clone, Debug)]
pub struct ArrayRef {
    component: RuntimeType,
    items: Arc<[Value]>,
}

impl ArrayRef {
    pub fn new(component: impl Into<RuntimeType>, items: Vec<Value>) -> Self {
        Self {
            component: component.into(),
            items: items.into(),
        }
    }

    pub fn component(&self) -> &RuntimeType {
        &self.component
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    pub fn object<T: Any + Send + Sync>(ty: TypeDescription, payload: T) -> Self {
        Value::Object(ObjectRef::new(ty, payload))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value, or `None` for null.
    pub fn runtime_type(&self) -> Option<RuntimeType> {
        let builtin = match self {
            Value::Null => return None,
            Value::Object(o) => return Some(RuntimeType::Type(o.ty())),
            Value::Array(a) => return Some(RuntimeType::array_of(a.component().clone())),
            Value::Boolean(_) => Builtin::Boolean,
            Value::Char(_) => Builtin::Character,
            Value::Byte(_) => Builtin::Byte,
            Value::Short(_) => Builtin::Short,
            Value::Int(_) => Builtin::Integer,
            Value::Long(_) => Builtin::Long,
            Value::Float(_) => Builtin::Float,
            Value::Double(_) => Builtin::Double,
            Value::String(_) => Builtin::String,
        };
        Some(builtin.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Narrows a numeric value to an `i32`: integers saturate, floating point truncates
    /// toward zero (NaN becomes 0). Non-numeric values yield `None`.
    pub fn to_priority(&self) -> Option<i32> {
        match self {
            Value::Float(v) => Some(*v as i32),
            Value::Double(v) => Some(*v as i32),
            other => other
                .as_i64()
                .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32),
        }
    }

    /// Identity for references, value equality for primitives and strings.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.items, &b.items),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

/// Fetches argument `index`, failing with the arity the body expected.
pub fn argument(args: &[Value], index: usize, expected: usize) -> Result<&Value, InvocationError> {
    if args.len() != expected {
        return Err(InvocationError::ArgumentCount {
            expected,
            found: args.len(),
        });
    }
    args.get(index).ok_or(InvocationError::ArgumentCount {
        expected,
        found: args.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_types_are_boxed() {
        assert_eq!(Value::Int(3).runtime_type(), Some(Builtin::Integer.into()));
        assert_eq!(Value::Char('x').runtime_type(), Some(Builtin::Character.into()));
        assert_eq!(Value::Null.runtime_type(), None);
        let array = Value::Array(ArrayRef::new(Builtin::String, vec![Value::string("a")]));
        assert_eq!(
            array.runtime_type(),
            Some(RuntimeType::array_of(Builtin::String))
        );
    }

    #[test]
    fn test_to_priority_conversions() {
        assert_eq!(Value::Int(7).to_priority(), Some(7));
        assert_eq!(Value::Long(i64::MAX).to_priority(), Some(i32::MAX));
        assert_eq!(Value::Long(i64::MIN).to_priority(), Some(i32::MIN));
        assert_eq!(Value::Double(-2.9).to_priority(), Some(-2));
        assert_eq!(Value::Float(f32::NAN).to_priority(), Some(0));
        assert_eq!(Value::Boolean(true).to_priority(), None);
        assert_eq!(Value::string("5").to_priority(), None);
    }

    #[test]
    fn test_same_uses_identity_for_objects() {
        let a = Value::object(Builtin::Object.ty(), 1u8);
        let b = Value::object(Builtin::Object.ty(), 1u8);
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert!(Value::string("x").same(&Value::string("x")));
        assert!(!Value::Int(1).same(&Value::Long(1)));
    }

    #[test]
    fn test_argument_checks_arity() {
        let args = [Value::Int(1)];
        assert!(argument(&args, 0, 1).is_ok());
        assert_eq!(
            argument(&args, 0, 2).unwrap_err(),
            InvocationError::ArgumentCount {
                expected: 2,
                found: 1
            }
        );
    }
}
