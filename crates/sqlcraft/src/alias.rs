//! Per-builder table/dataset alias registry.
//!
//! Aliases are keyed by [`TypeId`], so two distinct types sharing an
//! unqualified name can never collide in the map itself; only their default
//! aliases could collide in rendered output, and [`AliasRegistry::set`]
//! resolves that explicitly.

use std::any::TypeId;
use std::collections::HashMap;

use crate::error::SqlResult;
use crate::validate;

/// The unqualified name of a type, with generic arguments stripped.
///
/// `my_app::model::Account` becomes `Account`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    short.to_string()
}

/// Mapping from a Rust type to the dataset alias used to qualify its columns.
///
/// The registry is per-builder-instance: two builders referencing the same
/// type may hold different aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    aliases: HashMap<TypeId, String>,
}

impl AliasRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly set the alias for `T`. Last write wins; callable before or
    /// after the first auto-reference.
    pub fn set<T: 'static>(&mut self, alias: impl Into<String>) -> SqlResult<()> {
        let alias = validate::not_blank("alias", alias)?;
        self.aliases.insert(TypeId::of::<T>(), alias);
        Ok(())
    }

    /// Look up the alias for `T` without creating one.
    pub fn get<T: 'static>(&self) -> Option<&str> {
        self.aliases.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// Return the alias for `T`, lazily inserting the default (the type's
    /// unqualified name) on first reference.
    ///
    /// Lookups for a type not yet seen never fail; they create.
    pub fn get_or_create<T: 'static>(&mut self) -> String {
        self.aliases
            .entry(TypeId::of::<T>())
            .or_insert_with(short_type_name::<T>)
            .clone()
    }
}
