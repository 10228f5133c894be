//! Operator declarations
//!
//! A [`CallDeclaration`] is one manually written implementation of an
//! operator for an exact argument-type tuple. Declarations arrive either
//! already typed (built in Rust with the builder methods) or as a
//! [`Capture`] of the strings a source scanner recognised, which is
//! validated by [`Capture::resolve`].

use crate::error::{DeclarationError, Result};
use crate::types::TypeSignature;
use std::fmt;
use std::str::FromStr;

/// Modifier tags recognised on a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Two-argument operator that also accepts its arguments swapped
    Reversible,
    /// BigInt parameters also accept Int
    BigIntCast,
    /// Real parameters also accept BigInt and Int
    RealCast,
    /// The result is not echoed as a parenthesised expression
    NoExpr,
    /// The body receives the live stack before its arguments
    StackRef,
}

impl Tag {
    pub const ALL: [Tag; 5] = [
        Tag::Reversible,
        Tag::BigIntCast,
        Tag::RealCast,
        Tag::NoExpr,
        Tag::StackRef,
    ];

    /// The spelling used in declaration sources
    pub fn name(self) -> &'static str {
        match self {
            Tag::Reversible => "reversable",
            Tag::BigIntCast => "bigint_cast",
            Tag::RealCast => "real_cast",
            Tag::NoExpr => "no_expr",
            Tag::StackRef => "stack_ref",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.name() == name)
            .ok_or_else(|| DeclarationError::UnknownTag {
                name: name.to_string(),
                location: None,
            })
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tag {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self> {
        Tag::from_name(s)
    }
}

/// A set of [`Tag`]s
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u8);

impl TagSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    pub fn with(mut self, tag: Tag) -> Self {
        self.insert(tag);
        self
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut tags = TagSet::empty();
        for name in names {
            tags.insert(Tag::from_name(name.as_ref().trim())?);
        }
        Ok(tags)
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(tags: I) -> Self {
        let mut set = TagSet::empty();
        for tag in tags {
            set.insert(tag);
        }
        set
    }
}

/// Where a declaration was found
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One implementation of an operator for an exact argument-type tuple
#[derive(Debug, Clone, PartialEq)]
pub struct CallDeclaration<B> {
    pub operator: String,
    pub params: TypeSignature,
    pub tags: TagSet,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Literal argument lists, one entry per argument
    pub examples: Vec<Vec<String>>,
    pub location: Option<SourceLocation>,
    pub body: B,
}

impl<B> CallDeclaration<B> {
    pub fn new(operator: impl Into<String>, params: impl Into<TypeSignature>, body: B) -> Self {
        Self {
            operator: operator.into(),
            params: params.into(),
            tags: TagSet::empty(),
            description: None,
            category: None,
            examples: Vec::new(),
            location: None,
            body,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.arity()
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        for tag in tags {
            self.tags.insert(tag);
        }
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn example<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.examples.push(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Checks that only depend on the declaration itself
    pub(crate) fn validate(&self) -> Result<()> {
        if self.has_tag(Tag::Reversible) && self.arity() != 2 {
            return Err(DeclarationError::ReverseArity {
                operator: self.operator.clone(),
                arity: self.arity(),
                location: self.location.clone(),
            });
        }

        // stack_ref examples may list extra stack items below the arguments
        let stack_ref = self.has_tag(Tag::StackRef);
        let misfit = |args: &&Vec<String>| {
            args.len() < self.arity() || (!stack_ref && args.len() != self.arity())
        };
        if let Some(example) = self.examples.iter().find(misfit) {
            return Err(DeclarationError::ExampleArity {
                operator: self.operator.clone(),
                expected: self.arity(),
                found: example.len(),
                location: self.location.clone(),
            });
        }
        Ok(())
    }
}

impl<B: Implementation> CallDeclaration<B> {
    /// The declared types and tags must describe the body that will run
    pub(crate) fn check_body(&self) -> Result<()> {
        if let Some(body) = self.body.signature() {
            if *body != self.params {
                return Err(DeclarationError::BodySignature {
                    operator: self.operator.clone(),
                    declared: self.params.clone(),
                    body: body.clone(),
                    location: self.location.clone(),
                });
            }
        }

        if let Some(stack_aware) = self.body.stack_aware() {
            if stack_aware != self.has_tag(Tag::StackRef) {
                return Err(DeclarationError::StackRefMismatch {
                    operator: self.operator.clone(),
                    stack_aware,
                    location: self.location.clone(),
                });
            }
        }
        Ok(())
    }
}

/// What a registry can learn about an operator body before accepting it.
///
/// Opaque bodies keep the defaults and are taken on trust.
pub trait Implementation {
    /// Argument types the body accepts
    fn signature(&self) -> Option<&TypeSignature> {
        None
    }

    /// Whether the body expects the live stack before its arguments
    fn stack_aware(&self) -> Option<bool> {
        None
    }
}

impl Implementation for &str {}
impl Implementation for String {}

/// A declaration as recognised by a source scanner, before validation
#[derive(Debug, Clone)]
pub struct Capture<B> {
    pub operator_name: String,
    pub param_types: Vec<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub examples: Vec<Vec<String>>,
    pub location: Option<SourceLocation>,
    pub body: B,
}

impl<B> Capture<B> {
    pub fn new(operator_name: impl Into<String>, body: B) -> Self {
        Self {
            operator_name: operator_name.into(),
            param_types: Vec::new(),
            tags: Vec::new(),
            description: None,
            category: None,
            examples: Vec::new(),
            location: None,
            body,
        }
    }

    /// Resolve type and tag names against the fixed vocabularies
    pub fn resolve(self) -> Result<CallDeclaration<B>> {
        let locate = |error: DeclarationError| match &self.location {
            Some(location) => error.with_location(location),
            None => error,
        };

        let params = TypeSignature::from_names(&self.param_types).map_err(locate)?;
        let tags = TagSet::from_names(&self.tags).map_err(locate)?;

        let declaration = CallDeclaration {
            operator: self.operator_name,
            params,
            tags,
            description: self.description,
            category: self.category,
            examples: self.examples,
            location: self.location,
            body: self.body,
        };
        declaration.validate()?;
        Ok(declaration)
    }
}

/// The single input formatter of an operator
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterDeclaration<F> {
    pub operator: String,
    pub arity: usize,
    /// The formatter also receives the live stack
    pub stack_ref: bool,
    pub location: Option<SourceLocation>,
    pub format: F,
}

impl<F> FormatterDeclaration<F> {
    pub fn new(operator: impl Into<String>, arity: usize, format: F) -> Self {
        Self {
            operator: operator.into(),
            arity,
            stack_ref: false,
            location: None,
            format,
        }
    }

    pub fn stack_ref(mut self) -> Self {
        self.stack_ref = true;
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}
