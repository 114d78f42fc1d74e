// ============================================================================
// subject-store - Lenses
// Getter/setter pairs describing how a derived store views its parent
// ============================================================================

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::path::{self, Path};

/// Reads the derived value out of the parent value.
pub type Getter<I, O> = Rc<dyn Fn(&I) -> O>;

/// Produces the next parent value from a derived value and the current parent.
pub type Setter<I, O> = Rc<dyn Fn(O, I) -> I>;

/// Which constructor built a lens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LensKind {
    Identity,
    Path(Path),
    Function,
    ReadOnly,
}

/// How a [`DerivedStore`](crate::DerivedStore) maps its parent's value.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use subject_store::Lens;
///
/// let count = Lens::path("count");
/// let state = json!({"count": 1, "name": "demo"});
///
/// assert_eq!(count.get(&state), json!(1));
/// assert_eq!(
///     count.put(json!(2), state),
///     Some(json!({"count": 2, "name": "demo"}))
/// );
/// ```
pub struct Lens<I, O> {
    kind: LensKind,
    getter: Getter<I, O>,
    setter: Option<Setter<I, O>>,
}

impl<I, O> Clone for Lens<I, O> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<I: Clone + 'static> Lens<I, I> {
    /// The parent value itself; writes replace it.
    pub fn identity() -> Self {
        Self {
            kind: LensKind::Identity,
            getter: Rc::new(I::clone),
            setter: Some(Rc::new(|value: I, _parent: I| value)),
        }
    }
}

impl Lens<Value, Value> {
    /// The value at `selector`; writes go through [`path::set`].
    ///
    /// A missing value reads as `null`.
    pub fn path(selector: impl Into<Path>) -> Self {
        let selector = selector.into();
        let read = selector.clone();
        let write = selector.clone();
        Self {
            kind: LensKind::Path(selector),
            getter: Rc::new(move |parent: &Value| path::get(parent, &read, Value::Null)),
            setter: Some(Rc::new(move |value: Value, parent: Value| {
                match path::try_set(&parent, &write, value) {
                    Ok(updated) => updated,
                    Err(err) => {
                        tracing::warn!(path = %write, error = %err, "path lens write rejected");
                        parent
                    }
                }
            })),
        }
    }
}

impl<I: 'static, O: 'static> Lens<I, O> {
    /// An explicit getter/setter pair.
    pub fn function(
        getter: impl Fn(&I) -> O + 'static,
        setter: impl Fn(O, I) -> I + 'static,
    ) -> Self {
        Self {
            kind: LensKind::Function,
            getter: Rc::new(getter),
            setter: Some(Rc::new(setter)),
        }
    }

    /// A getter without setter; writes through the lens are dropped.
    pub fn read_only(getter: impl Fn(&I) -> O + 'static) -> Self {
        Self {
            kind: LensKind::ReadOnly,
            getter: Rc::new(getter),
            setter: None,
        }
    }

    /// Read through the lens.
    pub fn get(&self, parent: &I) -> O {
        (self.getter)(parent)
    }

    /// Write through the lens. `None` for read-only lenses.
    pub fn put(&self, value: O, parent: I) -> Option<I> {
        self.setter.as_ref().map(|setter| setter(value, parent))
    }

    /// Whether writes through this lens are dropped.
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }

    /// How this lens was built.
    pub fn kind(&self) -> &LensKind {
        &self.kind
    }

    pub(crate) fn getter(&self) -> Getter<I, O> {
        self.getter.clone()
    }
}

impl<I, O> fmt::Debug for Lens<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("kind", &self.kind)
            .field("read_only", &self.setter.is_none())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Form {
        name: String,
        age: u32,
    }

    #[test]
    fn identity_passes_through() {
        let lens = Lens::<i32, i32>::identity();
        assert_eq!(lens.get(&4), 4);
        assert_eq!(lens.put(5, 4), Some(5));
        assert_eq!(lens.kind(), &LensKind::Identity);
    }

    #[test]
    fn function_lens() {
        let age = Lens::function(
            |form: &Form| form.age,
            |age, form: Form| Form { age, ..form },
        );
        let form = Form {
            name: "Ada".into(),
            age: 36,
        };

        assert_eq!(age.get(&form), 36);
        assert_eq!(age.put(37, form).map(|f| f.age), Some(37));
    }

    #[test]
    fn read_only_drops_writes() {
        let len = Lens::read_only(|s: &String| s.len());
        assert_eq!(len.get(&"four".to_string()), 4);
        assert_eq!(len.put(1, "four".to_string()), None);
        assert!(len.is_read_only());
    }

    #[test]
    fn path_lens_reads_null_when_missing() {
        let lens = Lens::path("a.b");
        assert_eq!(lens.get(&json!({})), Value::Null);
        assert_eq!(lens.put(json!(1), json!({})), Some(json!({"a": {"b": 1}})));
        assert_eq!(lens.kind(), &LensKind::Path(Path::from("a.b")));
    }

    #[test]
    fn path_lens_keeps_parent_on_bad_write() {
        let lens = Lens::path("list.name");
        let parent = json!({"list": [1]});
        assert_eq!(lens.put(json!(1), parent.clone()), Some(parent));

        let lens = Lens::path("a.b[18446744073709551615]");
        assert_eq!(lens.put(json!(1), json!({})), Some(json!({})));
    }

    #[test]
    fn lens_debug() {
        let lens = Lens::read_only(|v: &i32| *v);
        assert!(format!("{:?}", lens).contains("ReadOnly"));
    }
}
