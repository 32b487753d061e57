//! Declarations that steer how a property maps onto a column name.
//!
//! Attributes are attached either to a single property ([`PropertyAttributes`])
//! or to the whole record type ([`TypeAttributes`]). The `bind_record!` macro
//! builds both from `#[...]` markers; they can also be assembled by hand when
//! implementing [`Record`](crate::Record) manually.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Separator characters stripped by case-insensitive matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Separators(u8);

impl Separators {
    pub const NONE: Self = Self(0);
    pub const UNDERSCORE: Self = Self(1);
    pub const HYPHEN: Self = Self(1 << 1);
    pub const SPACE: Self = Self(1 << 2);
    pub const ALL: Self = Self(Self::UNDERSCORE.0 | Self::HYPHEN.0 | Self::SPACE.0);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The separator characters that are active in this set.
    pub fn chars(self) -> impl Iterator<Item = char> {
        [(Self::UNDERSCORE, '_'), (Self::HYPHEN, '-'), (Self::SPACE, ' ')]
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, c)| c)
    }
}

impl Default for Separators {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for Separators {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A single name-transform declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// Explicit column name. `None` or an empty string is a malformed declaration.
    Rename(Option<String>),
    /// Exclude the property from schemas and matching when the flag is set.
    Ignore(bool),
    /// Strip the given separators and fold to lowercase before comparing.
    IgnoreCasing(Separators),
}

/// Attributes attached to one property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes(Vec<Attribute>);

impl PropertyAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rename(self, name: impl Into<String>) -> Self {
        self.with(Attribute::Rename(Some(name.into())))
    }

    /// Rename with a possibly absent name, mirroring a declaration whose value
    /// was never filled in.
    #[must_use]
    pub fn rename_opt(self, name: Option<&str>) -> Self {
        self.with(Attribute::Rename(name.map(str::to_string)))
    }

    #[must_use]
    pub fn ignore(self) -> Self {
        self.with(Attribute::Ignore(true))
    }

    #[must_use]
    pub fn ignore_when(self, ignored: bool) -> Self {
        self.with(Attribute::Ignore(ignored))
    }

    #[must_use]
    pub fn ignore_casing(self) -> Self {
        self.with(Attribute::IgnoreCasing(Separators::ALL))
    }

    #[must_use]
    pub fn ignore_casing_with(self, separators: Separators) -> Self {
        self.with(Attribute::IgnoreCasing(separators))
    }

    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.0.push(attribute);
        self
    }

    /// True if any `Ignore` attribute has its flag set.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Ignore(true)))
    }

    /// The first rename declaration, if any. The inner `Option` is the declared value.
    #[must_use]
    pub fn rename_value(&self) -> Option<Option<&str>> {
        self.0.iter().find_map(|a| match a {
            Attribute::Rename(name) => Some(name.as_deref()),
            _ => None,
        })
    }

    #[must_use]
    pub fn casing(&self) -> Option<Separators> {
        casing_of(&self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}

/// Attributes attached to the record type; they apply to every property that
/// does not override them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeAttributes(Vec<Attribute>);

impl TypeAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ignore_casing(self) -> Self {
        self.with(Attribute::IgnoreCasing(Separators::ALL))
    }

    #[must_use]
    pub fn ignore_casing_with(self, separators: Separators) -> Self {
        self.with(Attribute::IgnoreCasing(separators))
    }

    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.0.push(attribute);
        self
    }

    #[must_use]
    pub fn casing(&self) -> Option<Separators> {
        casing_of(&self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}

fn casing_of(attributes: &[Attribute]) -> Option<Separators> {
    attributes.iter().find_map(|a| match a {
        Attribute::IgnoreCasing(separators) => Some(*separators),
        _ => None,
    })
}

/// Casing rule in effect for a property: its own declaration first, then the
/// owning type's.
#[must_use]
pub fn effective_casing(property: &PropertyAttributes, owner: &TypeAttributes) -> Option<Separators> {
    property.casing().or_else(|| owner.casing())
}
