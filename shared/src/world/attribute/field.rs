use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::{
    world::attribute::{
        descriptive::{Alias, Description, Name},
        error::FieldError,
        locate::Locate,
        markers::{Narrative, Player},
    },
    Attribute, Container, Entity, EntityId,
};

// TaggedField

/// An attribute rendered for an external serializer: a tag naming the
/// attribute kind plus its values in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    pub tag: String,
    pub values: Vec<String>,
}

impl TaggedField {
    pub fn new<I, S>(tag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tag: tag.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(&self) -> Result<&str, FieldError> {
        match self.values.as_slice() {
            [value] => Ok(value),
            _ => Err(FieldError::InvalidValue {
                tag: self.tag.clone(),
                reason: format!("expected exactly one value, found {}", self.values.len()),
            }),
        }
    }
}

pub type AttributeConstructor = fn(&TaggedField) -> Result<Arc<dyn Attribute>, FieldError>;

// AttributeRegistry

/// Maps field tags to attribute constructors so a separate serializer can
/// rebuild entities from the fields [`Entity::describe`] produced.
pub struct AttributeRegistry {
    constructors: HashMap<String, AttributeConstructor>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry knowing every attribute defined in this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults: [(&str, AttributeConstructor); 7] = [
            (Name::TAG, Name::construct),
            (Description::TAG, Description::construct),
            (Alias::TAG, Alias::construct),
            (Player::TAG, Player::construct),
            (Narrative::TAG, Narrative::construct),
            (Locate::TAG, Locate::construct),
            (Container::TAG, Container::construct),
        ];
        for (tag, constructor) in defaults {
            registry.register(tag, constructor);
        }
        registry
    }

    /// Register a constructor for a tag
    ///
    /// # Panics
    ///
    /// Panics if the tag is already registered.
    /// Consider using `try_register` for non-panicking error handling.
    pub fn register(&mut self, tag: &str, constructor: AttributeConstructor) {
        self.try_register(tag, constructor)
            .expect("Attribute tag cannot be registered more than once!")
    }

    /// Register a constructor for a tag
    ///
    /// Returns an error if the tag is already registered.
    pub fn try_register(
        &mut self,
        tag: &str,
        constructor: AttributeConstructor,
    ) -> Result<(), FieldError> {
        if self.constructors.contains_key(tag) {
            return Err(FieldError::DuplicateTag {
                tag: tag.to_string(),
            });
        }
        self.constructors.insert(tag.to_string(), constructor);
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn construct(&self, field: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        let constructor =
            self.constructors
                .get(&field.tag)
                .ok_or_else(|| FieldError::UnknownTag {
                    tag: field.tag.clone(),
                })?;
        constructor(field)
    }

    /// Builds an entity from described fields, keeping their order. A restored
    /// `id` is reserved with the identity allocator; without one a fresh
    /// identity is allocated.
    pub fn build(
        &self,
        id: Option<EntityId>,
        fields: &[TaggedField],
    ) -> Result<Arc<Entity>, FieldError> {
        let attributes = fields
            .iter()
            .map(|field| self.construct(field))
            .collect::<Result<Vec<_>, _>>()?;

        let entity = match id {
            Some(id) => Entity::with_id(id, attributes),
            None => Entity::new(attributes),
        };
        debug!("Built {} from {} fields", entity.id(), fields.len());
        Ok(entity)
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
