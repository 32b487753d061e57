//! Column-name resolution.
//!
//! [`resolve`] turns a property name (or any other base name) into the name
//! the property is written under and compared by. [`normalize`] is the casing
//! step alone; it is applied to external field names with the same rule the
//! property uses, so both sides of a comparison are folded identically.

use crate::attributes::{effective_casing, PropertyAttributes, Separators, TypeAttributes};
use crate::error::{MapperError, Result};

/// Outcome of resolving a property's column name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedName {
    Column(String),
    Ignored,
}

impl ResolvedName {
    #[must_use]
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Self::Column(name) => Some(name),
            Self::Ignored => None,
        }
    }
}

/// Resolve `base` under the attributes of `property`.
///
/// Order: ignore, then rename, then casing (property-level before type-level).
///
/// # Errors
/// [`MapperError::MissingName`] if a rename is declared with an empty or absent value.
pub fn resolve(
    owner: &TypeAttributes,
    property: &str,
    attributes: &PropertyAttributes,
    base: &str,
) -> Result<ResolvedName> {
    if attributes.is_ignored() {
        return Ok(ResolvedName::Ignored);
    }

    let working = match attributes.rename_value() {
        Some(Some(name)) if !name.is_empty() => name,
        Some(_) => {
            return Err(MapperError::MissingName {
                property: property.to_string(),
            });
        }
        None => base,
    };

    let resolved = match effective_casing(attributes, owner) {
        Some(separators) => normalize(working, separators),
        None => working.to_string(),
    };
    Ok(ResolvedName::Column(resolved))
}

/// Fold a name for comparison against a property with the given attributes.
/// Rename does not apply here; only the casing rule does.
#[must_use]
pub fn comparison_name(owner: &TypeAttributes, attributes: &PropertyAttributes, name: &str) -> String {
    match effective_casing(attributes, owner) {
        Some(separators) => normalize(name, separators),
        None => name.to_string(),
    }
}

/// Strip every active separator and lowercase the result.
#[must_use]
pub fn normalize(name: &str, separators: Separators) -> String {
    name.chars()
        .filter(|c| !separators.chars().any(|s| s == *c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_only_active_separators() {
        assert_eq!(normalize("Order_Id-x y", Separators::ALL), "orderidxy");
        assert_eq!(normalize("Order_Id-x y", Separators::UNDERSCORE), "orderid-x y");
        assert_eq!(normalize("A-B", Separators::NONE), "a-b");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in ["Trade_ID", "some-Name here", "plain", "__x__"] {
            let once = normalize(name, Separators::ALL);
            assert_eq!(normalize(&once, Separators::ALL), once);
        }
    }

    #[test]
    fn ignore_wins_over_empty_rename() {
        let attrs = PropertyAttributes::new().rename_opt(None).ignore();
        let out = resolve(&TypeAttributes::new(), "p", &attrs, "p").unwrap();
        assert_eq!(out, ResolvedName::Ignored);
    }

    #[test]
    fn ignore_false_is_inert() {
        let attrs = PropertyAttributes::new().ignore_when(false);
        let out = resolve(&TypeAttributes::new(), "p", &attrs, "p").unwrap();
        assert_eq!(out, ResolvedName::Column("p".into()));
    }

    #[test]
    fn property_casing_overrides_type_casing() {
        let owner = TypeAttributes::new().ignore_casing();
        let attrs = PropertyAttributes::new().ignore_casing_with(Separators::HYPHEN);
        let out = resolve(&owner, "p", &attrs, "Net_Value-X").unwrap();
        assert_eq!(out, ResolvedName::Column("net_valuex".into()));
    }
}
