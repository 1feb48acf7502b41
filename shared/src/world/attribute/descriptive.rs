use std::sync::Arc;

use crate::{
    world::attribute::error::FieldError, Attribute, AttributeKind, AttributeOwner, Capability,
    NullCapability, TaggedField,
};

// Name
#[derive(Debug)]
pub struct Name {
    owner: AttributeOwner,
    name: String,
}

impl Name {
    pub const TAG: &'static str = "name";

    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            name: name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn construct(field: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new(field.single()?))
    }
}

impl Attribute for Name {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new(self.name.clone())
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, [self.name.as_str()]))
    }
}

impl Capability for Name {
    const KIND: AttributeKind = AttributeKind::new("name");
}

impl NullCapability for Name {
    fn null() -> Arc<Self> {
        Self::new("")
    }
}

// Description
#[derive(Debug)]
pub struct Description {
    owner: AttributeOwner,
    text: String,
}

impl Description {
    pub const TAG: &'static str = "description";

    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            text: text.into(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn construct(field: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new(field.single()?))
    }
}

impl Attribute for Description {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new(self.text.clone())
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, [self.text.as_str()]))
    }
}

impl Capability for Description {
    const KIND: AttributeKind = AttributeKind::new("description");
}

impl NullCapability for Description {
    fn null() -> Arc<Self> {
        Self::new("")
    }
}

// Alias

/// Words a container search can match an entity by. Matching ignores case.
#[derive(Debug)]
pub struct Alias {
    owner: AttributeOwner,
    aliases: Vec<String>,
}

impl Alias {
    pub const TAG: &'static str = "alias";

    pub fn new<I, S>(aliases: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            aliases: aliases
                .into_iter()
                .map(|alias| alias.as_ref().trim().to_uppercase())
                .filter(|alias| !alias.is_empty())
                .collect(),
        })
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        let alias = alias.trim();
        self.aliases
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(alias))
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn construct(field: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new(&field.values))
    }
}

impl Attribute for Alias {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new(&self.aliases)
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, self.aliases.iter().map(String::as_str)))
    }
}

impl Capability for Alias {
    const KIND: AttributeKind = AttributeKind::new("alias");
}

impl NullCapability for Alias {
    fn null() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }
}
