//! Object mapping between declared shapes.
//!
//! The [`Mapper`] turns a value of a source type `S` into a value of a destination type
//! `D`. A conversion registered for the `(S, D)` pair wins; otherwise the value is mapped
//! by field correspondence: `S` is serialized to a BSON document and `D` is deserialized
//! from it, so fields are matched by their serialized names.
//!
//! # Example
//!
//! ```ignore
//! use docrepo::mapper::Mapper;
//!
//! let mapper = Mapper::builder()
//!     .register(|user: User| UserVm { display: user.name.to_uppercase() })
//!     .build();
//!
//! let vm: UserVm = mapper.map::<User, UserVm>(user)?;
//! ```

use bson::{
    Bson,
    de::deserialize_from_bson,
    ser::serialize_to_bson,
};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
};

use crate::error::{MappingError, MappingResult};

type Conversion = Box<dyn Fn(Box<dyn Any>) -> Option<Box<dyn Any>> + Send + Sync>;

/// Transforms objects between declared shapes.
///
/// A mapper is configured once through [`MapperBuilder`] and is immutable afterwards, so
/// it can be shared between services behind an `Arc`.
#[derive(Default)]
pub struct Mapper {
    conversions: HashMap<(TypeId, TypeId), Conversion>,
}

impl Mapper {
    /// Creates a mapper without registered conversions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for registering conversions.
    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    /// Returns `true` if a conversion is registered for the `(S, D)` pair.
    pub fn has_conversion<S: 'static, D: 'static>(&self) -> bool {
        self.conversions
            .contains_key(&(TypeId::of::<S>(), TypeId::of::<D>()))
    }

    /// Maps one object of shape `S` into shape `D`.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if field correspondence fails, for example when `D`
    /// requires a field that `S` does not provide.
    pub fn map<S, D>(&self, object: S) -> MappingResult<D>
    where
        S: Serialize + 'static,
        D: DeserializeOwned + 'static,
    {
        match self.conversions.get(&(TypeId::of::<S>(), TypeId::of::<D>())) {
            Some(conversion) => conversion(Box::new(object))
                .and_then(|value| value.downcast::<D>().ok())
                .map(|value| *value)
                .ok_or(MappingError::TypeMismatch {
                    source_type: type_name::<S>(),
                    destination_type: type_name::<D>(),
                }),
            None => Self::map_fields(&object),
        }
    }

    /// Maps a sequence of objects, preserving order and count.
    ///
    /// Stops at the first object that fails to map.
    pub fn map_array<S, D>(&self, objects: Vec<S>) -> MappingResult<Vec<D>>
    where
        S: Serialize + 'static,
        D: DeserializeOwned + 'static,
    {
        objects
            .into_iter()
            .map(|object| self.map::<S, D>(object))
            .collect()
    }

    fn map_fields<S, D>(object: &S) -> MappingResult<D>
    where
        S: Serialize,
        D: DeserializeOwned,
    {
        let failed = |e: bson::error::Error| MappingError::Serialization {
            source_type: type_name::<S>(),
            destination_type: type_name::<D>(),
            message: e.to_string(),
        };

        let bson: Bson = serialize_to_bson(object).map_err(failed)?;

        deserialize_from_bson(bson).map_err(failed)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("conversions", &self.conversions.len())
            .finish()
    }
}

/// Builder for [`Mapper`] instances.
#[derive(Default)]
pub struct MapperBuilder {
    conversions: HashMap<(TypeId, TypeId), Conversion>,
}

impl MapperBuilder {
    /// Registers an explicit conversion from `S` to `D`, replacing any earlier one.
    pub fn register<S, D, F>(mut self, conversion: F) -> Self
    where
        S: 'static,
        D: 'static,
        F: Fn(S) -> D + Send + Sync + 'static,
    {
        self.conversions.insert(
            (TypeId::of::<S>(), TypeId::of::<D>()),
            Box::new(move |value: Box<dyn Any>| {
                value
                    .downcast::<S>()
                    .ok()
                    .map(|source| Box::new(conversion(*source)) as Box<dyn Any>)
            }),
        );
        self
    }

    /// Builds the immutable [`Mapper`].
    pub fn build(self) -> Mapper {
        Mapper { conversions: self.conversions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Account {
        name: String,
        email: String,
        password: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct AccountVm {
        name: String,
        email: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Greeting {
        text: String,
    }

    fn account(name: &str) -> Account {
        Account {
            name: name.into(),
            email: format!("{name}@example.com"),
            password: "secret".into(),
        }
    }

    #[test]
    fn maps_by_field_correspondence() {
        let vm: AccountVm = Mapper::new().map(account("ada")).unwrap();

        assert_eq!(
            vm,
            AccountVm {
                name: "ada".into(),
                email: "ada@example.com".into(),
            }
        );
    }

    #[test]
    fn missing_destination_fields_fail() {
        let err = Mapper::new()
            .map::<Account, Greeting>(account("ada"))
            .unwrap_err();

        assert!(matches!(err, MappingError::Serialization { .. }));
    }

    #[test]
    fn registered_conversion_wins() {
        let mapper = Mapper::builder()
            .register(|a: Account| Greeting { text: format!("hello {}", a.name) })
            .build();

        assert!(mapper.has_conversion::<Account, Greeting>());
        assert_eq!(
            mapper.map::<Account, Greeting>(account("bob")).unwrap(),
            Greeting { text: "hello bob".into() }
        );
    }

    #[test]
    fn map_array_preserves_order_and_count() {
        let names = ["c", "a", "b"];
        let vms: Vec<AccountVm> = Mapper::new()
            .map_array(names.iter().map(|n| account(n)).collect())
            .unwrap();

        assert_eq!(
            vms.iter().map(|vm| vm.name.as_str()).collect::<Vec<_>>(),
            names
        );
    }
}
