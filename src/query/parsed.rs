//! Parsed-query binding resolution.
//!
//! Lets end-user query text like `tag:urgent author:"Ada Lovelace"` drive
//! typed constraints. A binding associates a logical name with a leaf
//! template whose value slot is open; parsing decomposes the text into
//! `name:token` segments and substitutes each token into the template
//! registered for its name.
//!
//! # Example
//!
//! ```rust
//! use docsearch::query::{bind, parse_bindings, parsed_from};
//!
//! let bindings = parse_bindings([
//!     bind("matchConstraint").word("wordKey"),
//!     bind("tag").collection(),
//! ])?;
//!
//! let constraint = parsed_from("matchConstraint:matchWord1", &bindings)?;
//! # let _ = constraint;
//! # Ok::<(), docsearch::QueryError>(())
//! ```

use std::collections::BTreeMap;

use crate::error::QueryError;

use super::constraint::Constraint;

/// Start declaring a binding for the logical name used in query text.
pub fn bind(name: impl Into<String>) -> Bind {
    Bind { name: name.into() }
}

/// A binding name waiting for its leaf template.
#[derive(Debug, Clone)]
pub struct Bind {
    name: String,
}

impl Bind {
    /// Bind the name to a word constraint on `field`; the parsed token
    /// becomes the search text.
    #[must_use]
    pub fn word(self, field: impl Into<String>) -> BoundConstraint {
        BoundConstraint {
            name: self.name,
            template: LeafTemplate::Word {
                field: field.into(),
            },
        }
    }

    /// Bind the name to a value constraint on `field`; the parsed token
    /// becomes the literal.
    #[must_use]
    pub fn value(self, field: impl Into<String>) -> BoundConstraint {
        BoundConstraint {
            name: self.name,
            template: LeafTemplate::Value {
                field: field.into(),
            },
        }
    }

    /// Bind the name to a collection constraint; the parsed token becomes
    /// the collection name.
    #[must_use]
    pub fn collection(self) -> BoundConstraint {
        BoundConstraint {
            name: self.name,
            template: LeafTemplate::Collection,
        }
    }
}

/// A bare `bind(name)` used directly as a constraint is an unresolved
/// placeholder; building a query around it fails until the binding is
/// resolved through [`parsed_from`].
impl From<Bind> for Constraint {
    fn from(b: Bind) -> Self {
        Constraint::Bound { name: b.name }
    }
}

/// A leaf template tagged with its binding name, ready for registration.
#[derive(Debug, Clone)]
pub struct BoundConstraint {
    name: String,
    template: LeafTemplate,
}

#[derive(Debug, Clone)]
enum LeafTemplate {
    Word { field: String },
    Value { field: String },
    Collection,
}

impl LeafTemplate {
    fn fill(&self, token: &str) -> Constraint {
        match self {
            Self::Word { field } => Constraint::word(field.as_str(), token),
            Self::Value { field } => Constraint::value(field.as_str(), token),
            Self::Collection => Constraint::collection(token),
        }
    }
}

/// The registered bindings a parsed query resolves against.
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: BTreeMap<String, LeafTemplate>,
}

impl BindingSet {
    /// Number of registered binding names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn resolve(&self, name: &str, token: &str) -> Result<Constraint, QueryError> {
        let Some(template) = self.bindings.get(name) else {
            return Err(QueryError::UnboundConstraint {
                name: name.to_string(),
            });
        };
        Ok(template.fill(token))
    }
}

/// Register leaf templates under their binding names.
///
/// Fails with [`QueryError::InvalidQuery`] when two templates share a name.
pub fn parse_bindings(
    templates: impl IntoIterator<Item = BoundConstraint>,
) -> Result<BindingSet, QueryError> {
    let mut bindings = BTreeMap::new();
    for BoundConstraint { name, template } in templates {
        if bindings.insert(name.clone(), template).is_some() {
            return Err(QueryError::invalid(format!(
                "duplicate binding '{name}'"
            )));
        }
    }
    Ok(BindingSet { bindings })
}

/// Resolve query text against registered bindings into a concrete
/// constraint.
///
/// Text is a whitespace-separated list of `name:token` segments; a token
/// may be double-quoted to include spaces. Segments compose with an
/// implicit `and`, left to right. Fails with [`QueryError::Parse`] when
/// the text cannot be decomposed and [`QueryError::UnboundConstraint`]
/// when a segment names an unregistered binding.
pub fn parsed_from(text: &str, bindings: &BindingSet) -> Result<Constraint, QueryError> {
    let segments = scan_segments(text)?;
    let mut children = Vec::with_capacity(segments.len());
    for (name, token) in &segments {
        children.push(bindings.resolve(name, token)?);
    }
    Constraint::all_of(children)
}

fn scan_segments(text: &str) -> Result<Vec<(String, String)>, QueryError> {
    let mut segments = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c == ':' || c.is_whitespace() {
                break;
            }
            name.push(c);
            chars.next();
        }
        if chars.next_if_eq(&':').is_none() {
            return Err(QueryError::parse(
                text,
                format!("segment '{name}' is not of the form name:token"),
            ));
        }
        if name.is_empty() {
            return Err(QueryError::parse(text, "segment has an empty name"));
        }

        let token = if chars.next_if_eq(&'"').is_some() {
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break token,
                    Some(c) => token.push(c),
                    None => {
                        return Err(QueryError::parse(
                            text,
                            format!("unterminated quote in segment '{name}'"),
                        ))
                    }
                }
            }
        } else {
            let mut token = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                token.push(c);
            }
            token
        };
        if token.is_empty() {
            return Err(QueryError::parse(
                text,
                format!("segment '{name}' has an empty token"),
            ));
        }

        segments.push((name, token));
    }

    if segments.is_empty() {
        return Err(QueryError::parse(text, "query text is empty"));
    }
    Ok(segments)
}
