//! Identifier management using string interning.
//!
//! Declaration names, inheritance targets and type names all flow through
//! the resolver as [`Id`] values. Interning keeps them `Copy` and makes the
//! many name comparisons the resolver performs cheap.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> std::sync::MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier.
///
/// # Examples
///
/// ```
/// use oven_core::identifier::Id;
///
/// let iface = Id::new("BadgeManager");
/// assert_eq!(iface, "BadgeManager");
///
/// let scoped = Id::new("tizen").create_nested(Id::new("WebAPIException"));
/// assert_eq!(scoped, "tizen::WebAPIException");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a scoped ID by joining `self` and `child_id` with `::`.
    pub fn create_nested(&self, child_id: Id) -> Self {
        let nested_name = format!("{self}::{child_id}");
        Self::new(&nested_name)
    }

    /// Runs `f` with the string this identifier stands for.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }

    /// Returns `true` if the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.with_str(str::is_empty)
    }

    /// ASCII case-insensitive comparison against a plain string.
    ///
    /// Module names given on the command line are matched this way.
    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        self.with_str(|s| s.eq_ignore_ascii_case(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Copy out before writing so the interner lock is not held across
        // arbitrary formatter code.
        let value = self.with_str(str::to_owned);
        f.write_str(&value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
