//! Ontology value, builder and validation.

use crate::classify::CategoryRule;
use crate::error::OntologyError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trailmap_protocol::AbstractionLevel;

/// A canonical term and everything the ontology knows about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDefinition {
    /// Canonical name.
    pub name: String,
    /// Alternative spellings matched case-insensitively.
    pub aliases: Vec<String>,
    /// Owning category.
    pub category: String,
    /// Canonical names of prerequisite terms.
    pub prerequisites: Vec<String>,
    /// Declared level; lookups default to 3 when absent.
    pub abstraction_level: Option<AbstractionLevel>,
    pub description: Option<String>,
}

impl TermDefinition {
    /// Start a term definition with no aliases or prerequisites.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            category: category.into(),
            prerequisites: Vec::new(),
            abstraction_level: None,
            description: None,
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|alias| alias.to_string()).collect();
        self
    }

    pub fn prerequisites(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|term| term.to_string()).collect();
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.abstraction_level = AbstractionLevel::new(level);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Display metadata for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub parent: Option<String>,
}

impl CategoryInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color: color.into(),
            icon: icon.into(),
            parent: None,
        }
    }
}

/// Immutable controlled vocabulary.
///
/// Term order is declaration order and is significant: classification
/// returns the category of the first matched term.
#[derive(Debug, Clone)]
pub struct Ontology {
    terms: Vec<TermDefinition>,
    index: HashMap<String, usize>,
    /// Lowercased canonical name and aliases per term.
    pub(crate) needles: Vec<Vec<String>>,
    categories: Vec<CategoryInfo>,
    pub(crate) fallback_rules: Vec<CategoryRule>,
    fallback_category: String,
}

impl Ontology {
    /// Start building an ontology.
    pub fn builder() -> OntologyBuilder {
        OntologyBuilder::default()
    }

    /// All terms in declaration order.
    pub fn terms(&self) -> &[TermDefinition] {
        &self.terms
    }

    /// Look up a term by canonical name.
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.index.get(name).map(|idx| &self.terms[*idx])
    }

    pub fn contains_term(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All categories in declaration order.
    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Catch-all category used when nothing else matches.
    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }

    /// Ordered keyword rules consulted when no term matches.
    pub fn fallback_rules(&self) -> &[CategoryRule] {
        &self.fallback_rules
    }

    /// Declared prerequisites of a term; empty for unknown terms.
    pub fn prerequisites(&self, term: &str) -> &[String] {
        self.term(term)
            .map(|def| def.prerequisites.as_slice())
            .unwrap_or_default()
    }

    /// Declared abstraction level, defaulting to 3.
    pub fn abstraction_level(&self, term: &str) -> AbstractionLevel {
        self.term(term)
            .and_then(|def| def.abstraction_level)
            .unwrap_or_default()
    }

    /// Category of a term, defaulting to the fallback category.
    pub fn term_category(&self, term: &str) -> &str {
        self.term(term)
            .map(|def| def.category.as_str())
            .unwrap_or(&self.fallback_category)
    }

    /// Whether `prerequisite` is a declared prerequisite of `term`.
    pub fn requires(&self, term: &str, prerequisite: &str) -> bool {
        self.prerequisites(term)
            .iter()
            .any(|name| name == prerequisite && self.contains_term(name))
    }

    /// Length of the longest prerequisite chain below a term.
    ///
    /// Unknown prerequisite names are skipped and a term already on the
    /// current path is never revisited, so the walk terminates even on a
    /// cyclic table.
    pub fn prerequisite_depth(&self, term: &str) -> usize {
        let mut path = Vec::new();
        self.depth_from(term, &mut path)
    }

    fn depth_from<'a>(&'a self, term: &str, path: &mut Vec<&'a str>) -> usize {
        let Some(def) = self.term(term) else {
            return 0;
        };
        path.push(def.name.as_str());
        let mut deepest = 0;
        for prerequisite in &def.prerequisites {
            if !self.contains_term(prerequisite) || path.contains(&prerequisite.as_str()) {
                continue;
            }
            deepest = deepest.max(1 + self.depth_from(prerequisite, path));
        }
        path.pop();
        deepest
    }
}

/// Builder that validates the vocabulary on [`OntologyBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct OntologyBuilder {
    terms: Vec<TermDefinition>,
    categories: Vec<CategoryInfo>,
    rules: Vec<RuleSpec>,
    fallback_category: Option<String>,
}

#[derive(Debug, Clone)]
struct RuleSpec {
    category: String,
    pattern: String,
    unless_followed_by: Option<String>,
}

impl OntologyBuilder {
    /// Declare a category.
    pub fn category(mut self, category: CategoryInfo) -> Self {
        self.categories.push(category);
        self
    }

    /// Declare a term; order of calls is the ontology iteration order.
    pub fn term(mut self, term: TermDefinition) -> Self {
        self.terms.push(term);
        self
    }

    /// Append a keyword rule to the fallback priority list.
    ///
    /// `pattern` is matched case-insensitively. A match immediately followed
    /// by `unless_followed_by` does not count.
    pub fn fallback_rule(
        mut self,
        category: impl Into<String>,
        pattern: impl Into<String>,
        unless_followed_by: Option<&str>,
    ) -> Self {
        self.rules.push(RuleSpec {
            category: category.into(),
            pattern: pattern.into(),
            unless_followed_by: unless_followed_by.map(str::to_string),
        });
        self
    }

    /// Set the catch-all category.
    pub fn fallback_category(mut self, name: impl Into<String>) -> Self {
        self.fallback_category = Some(name.into());
        self
    }

    /// Validate and freeze the ontology.
    ///
    /// Rejects duplicate names, undeclared categories, self-referencing
    /// terms and prerequisite cycles. Prerequisites naming unknown terms are
    /// kept but never match.
    pub fn build(self) -> Result<Ontology, OntologyError> {
        let mut category_names = HashMap::new();
        for (idx, category) in self.categories.iter().enumerate() {
            if category_names.insert(category.name.clone(), idx).is_some() {
                return Err(OntologyError::DuplicateCategory(category.name.clone()));
            }
        }

        let fallback_category = match self.fallback_category {
            Some(name) => name,
            None => self
                .categories
                .last()
                .map(|category| category.name.clone())
                .unwrap_or_default(),
        };
        if !category_names.contains_key(&fallback_category) {
            return Err(OntologyError::UnknownCategory {
                owner: "fallback category".to_string(),
                category: fallback_category,
            });
        }

        let mut index = HashMap::new();
        for (idx, term) in self.terms.iter().enumerate() {
            if index.insert(term.name.clone(), idx).is_some() {
                return Err(OntologyError::DuplicateTerm(term.name.clone()));
            }
            if !category_names.contains_key(&term.category) {
                return Err(OntologyError::UnknownCategory {
                    owner: format!("term {}", term.name),
                    category: term.category.clone(),
                });
            }
            if term.prerequisites.iter().any(|name| name == &term.name) {
                return Err(OntologyError::SelfReference(term.name.clone()));
            }
        }

        for term in &self.terms {
            for prerequisite in &term.prerequisites {
                if !index.contains_key(prerequisite) {
                    warn!(
                        "unknown prerequisite ignored (term={}, prerequisite={})",
                        term.name, prerequisite
                    );
                }
            }
        }

        if let Some(cycle) = find_cycle(&self.terms, &index) {
            return Err(OntologyError::PrerequisiteCycle(cycle));
        }

        let mut fallback_rules = Vec::with_capacity(self.rules.len());
        for rule in self.rules {
            if !category_names.contains_key(&rule.category) {
                return Err(OntologyError::UnknownCategory {
                    owner: format!("fallback rule /{}/", rule.pattern),
                    category: rule.category,
                });
            }
            fallback_rules.push(CategoryRule::compile(
                rule.category,
                &rule.pattern,
                rule.unless_followed_by,
            )?);
        }

        let needles = self.terms.iter().map(term_needles).collect();
        debug!(
            "ontology built (terms={}, categories={}, rules={})",
            self.terms.len(),
            self.categories.len(),
            fallback_rules.len()
        );
        Ok(Ontology {
            terms: self.terms,
            index,
            needles,
            categories: self.categories,
            fallback_rules,
            fallback_category,
        })
    }
}

/// Lowercased canonical name plus aliases, without duplicates or blanks.
fn term_needles(term: &TermDefinition) -> Vec<String> {
    let mut needles: Vec<String> = Vec::with_capacity(term.aliases.len() + 1);
    for candidate in std::iter::once(&term.name).chain(term.aliases.iter()) {
        let lowered = candidate.trim().to_lowercase();
        if !lowered.is_empty() && !needles.contains(&lowered) {
            needles.push(lowered);
        }
    }
    needles
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

/// Depth-first search for a prerequisite cycle; returns the cycle path.
fn find_cycle(terms: &[TermDefinition], index: &HashMap<String, usize>) -> Option<Vec<String>> {
    let mut marks = vec![Mark::Unvisited; terms.len()];
    let mut stack = Vec::new();
    for start in 0..terms.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        if let Some(cycle) = visit(start, terms, index, &mut marks, &mut stack) {
            return Some(cycle);
        }
    }
    None
}

fn visit(
    node: usize,
    terms: &[TermDefinition],
    index: &HashMap<String, usize>,
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
) -> Option<Vec<String>> {
    marks[node] = Mark::Active;
    stack.push(node);
    for prerequisite in &terms[node].prerequisites {
        let Some(&next) = index.get(prerequisite) else {
            continue;
        };
        match marks[next] {
            Mark::Active => {
                let start = stack.iter().position(|idx| *idx == next)?;
                let mut cycle: Vec<String> = stack[start..]
                    .iter()
                    .map(|idx| terms[*idx].name.clone())
                    .collect();
                cycle.push(terms[next].name.clone());
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, terms, index, marks, stack) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }
    stack.pop();
    marks[node] = Mark::Done;
    None
}
