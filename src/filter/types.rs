//! Filter types
//!
//! Defines filter table entries and resolved filter sets.

use crate::types::QueryParams;

/// How a filter compares an entity field with the request value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// Case-sensitive substring match
    Contains,
    /// Exact equality
    Equals,
}

/// Type a filter's raw query value is parsed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
}

/// A parsed filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    /// The raw value did not parse for the filter's kind; matches nothing
    Unmatchable,
}

impl FilterValue {
    /// Parse a raw query value for `kind`
    pub fn parse(kind: ValueKind, raw: &str) -> Self {
        match kind {
            ValueKind::Text => Self::Text(raw.to_string()),
            ValueKind::Integer => raw.parse().map_or(Self::Unmatchable, Self::Integer),
        }
    }
}

/// A borrowed entity field a filter compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
}

/// One entry of a resource's filter table
pub struct FilterDef<T: 'static> {
    /// Query parameter that activates the filter
    pub key: &'static str,
    /// Column the filter applies to in relational storage
    pub column: &'static str,
    pub op: MatchOp,
    pub kind: ValueKind,
    /// Field accessor used for in-memory evaluation
    pub field: fn(&T) -> FieldValue<'_>,
}

impl<T: 'static> std::fmt::Debug for FilterDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDef")
            .field("key", &self.key)
            .field("column", &self.column)
            .field("op", &self.op)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> FilterDef<T> {
    /// Evaluate this entry against one entity
    pub fn matches(&self, item: &T, value: &FilterValue) -> bool {
        match (self.op, (self.field)(item), value) {
            (MatchOp::Contains, FieldValue::Text(field), FilterValue::Text(needle)) => {
                field.contains(needle.as_str())
            }
            (MatchOp::Equals, FieldValue::Text(field), FilterValue::Text(expected)) => {
                field == expected.as_str()
            }
            (MatchOp::Equals, FieldValue::Integer(field), FilterValue::Integer(expected)) => {
                field == *expected
            }
            _ => false,
        }
    }
}

/// Entities with a filter table
pub trait Filterable: Sized + 'static {
    /// Filters accepted for this entity, keyed by query parameter
    const FILTERS: &'static [FilterDef<Self>];
}

/// A table entry bound to the value taken from a request
pub struct Filter<T: 'static> {
    def: &'static FilterDef<T>,
    value: FilterValue,
}

impl<T: 'static> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("key", &self.def.key)
            .field("value", &self.value)
            .finish()
    }
}

impl<T: 'static> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            def: self.def,
            value: self.value.clone(),
        }
    }
}

impl<T: 'static> Filter<T> {
    pub(crate) fn new(def: &'static FilterDef<T>, value: FilterValue) -> Self {
        Self { def, value }
    }

    pub fn def(&self) -> &'static FilterDef<T> {
        self.def
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    pub fn key(&self) -> &'static str {
        self.def.key
    }

    pub fn matches(&self, item: &T) -> bool {
        self.def.matches(item, &self.value)
    }
}

/// The filters a request activated, combined with logical AND
pub struct FilterSet<T: 'static> {
    filters: Vec<Filter<T>>,
}

impl<T: 'static> std::fmt::Debug for FilterSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.filters.iter()).finish()
    }
}

impl<T: 'static> Clone for FilterSet<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<T: 'static> Default for FilterSet<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
        }
    }
}

impl<T: Filterable> FilterSet<T> {
    /// Resolve the filters of `T` present in `params`
    pub fn from_params(params: &QueryParams) -> Self {
        Self::resolve(T::FILTERS, params)
    }
}

impl<T: 'static> FilterSet<T> {
    /// An empty set that matches everything
    pub fn none() -> Self {
        Self::default()
    }

    /// Keep the entries of `table` whose key appears in `params`
    pub fn resolve(table: &'static [FilterDef<T>], params: &QueryParams) -> Self {
        table
            .iter()
            .filter_map(|def| {
                params
                    .get(def.key)
                    .map(|raw| Filter::new(def, FilterValue::parse(def.kind, raw)))
            })
            .fold(Self::none(), Self::with)
    }

    /// Add one filter
    pub(crate) fn with(mut self, filter: Filter<T>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether `item` passes every filter
    pub fn matches(&self, item: &T) -> bool {
        self.filters.iter().all(|filter| filter.matches(item))
    }

    /// Narrow `items` to those passing every filter, keeping their order
    pub fn apply<'a, I>(&'a self, items: I) -> impl Iterator<Item = &'a T> + 'a
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        items.into_iter().filter(move |item| self.matches(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter<T>> {
        self.filters.iter()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.filters.iter().map(Filter::key).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
