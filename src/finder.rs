use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ClosureGraphError,
    node::{Triple, TriplePattern, validate_pattern},
};

pub type TripleIter<'a> = Box<dyn Iterator<Item = Triple> + 'a>;

/// Pattern lookup over triples, implemented by the cache itself and by every
/// store a cache can be seeded from.
pub trait Finder {
    fn find(&self, pattern: &TriplePattern) -> Result<TripleIter<'_>, ClosureGraphError>;

    fn contains(&self, pattern: &TriplePattern) -> Result<bool, ClosureGraphError> {
        Ok(self.find(pattern)?.next().is_some())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Triple>", into = "Vec<Triple>")]
pub struct FactSet {
    triples: Vec<Triple>,
    index: AHashSet<Triple>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        if !self.index.insert(triple.clone()) {
            return false;
        }
        self.triples.push(triple);
        true
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        if !self.index.remove(triple) {
            return false;
        }
        self.triples.retain(|t| t != triple);
        true
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for FactSet {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut set = FactSet::new();
        for triple in iter {
            set.insert(triple);
        }
        set
    }
}

impl From<Vec<Triple>> for FactSet {
    fn from(triples: Vec<Triple>) -> Self {
        triples.into_iter().collect()
    }
}

impl From<FactSet> for Vec<Triple> {
    fn from(set: FactSet) -> Self {
        set.triples
    }
}

impl Finder for FactSet {
    fn find(&self, pattern: &TriplePattern) -> Result<TripleIter<'_>, ClosureGraphError> {
        validate_pattern(pattern)?;
        let pattern = pattern.clone();
        Ok(Box::new(
            self.triples
                .iter()
                .filter(move |triple| pattern.matches(triple))
                .cloned(),
        ))
    }
}
