//! Language assignment and alternate-language set closure.
//!
//! Entries declare alternate-language links one-directionally and possibly
//! partially; the linker closes them into equivalence classes with a
//! union-find pass, then resolves each entry's language:
//!
//! - Phase 1: an entry whose "Languages available" cell named exactly one
//!   language gets that language directly.
//! - Phase 2: within each class, at most one entry may still be
//!   unresolved; subtracting the languages already taken by its siblings
//!   from its own candidates must leave exactly one, which it gets.
//!
//! Afterwards every entry's `alt_language_ids` holds its full class,
//! sorted and self-inclusive. Singleton classes get `{self}`. Results are
//! independent of row order.

use std::collections::HashMap;

use polidoc_shared::{PolidocError, Result};

use crate::rows::ImportEntry;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Assign a language to every entry and close alternate-language sets.
///
/// Expects referential validation to have run already, so every id in
/// `alt_language_ids` names an entry in the batch.
pub fn link_languages(entries: &mut [ImportEntry]) -> Result<()> {
    for import in entries.iter_mut() {
        if import.language_candidates.len() == 1 {
            import.entry.language = import.language_candidates[0].clone();
        }
    }

    let index: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, import)| (import.entry.item_id.as_str(), i))
        .collect();

    let mut uf = UnionFind::new(entries.len());
    for (i, import) in entries.iter().enumerate() {
        for alt_id in &import.entry.alt_language_ids {
            if let Some(&j) = index.get(alt_id.as_str()) {
                uf.union(i, j);
            }
        }
    }

    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..entries.len() {
        let root = uf.find(i);
        components.entry(root).or_default().push(i);
    }

    for members in components.values() {
        resolve_component(entries, members)?;

        let mut class_ids: Vec<String> = members
            .iter()
            .map(|&i| entries[i].entry.item_id.clone())
            .collect();
        class_ids.sort();
        for &i in members {
            entries[i].entry.alt_language_ids = class_ids.clone();
        }
    }

    Ok(())
}

/// Resolve the language of each still-unassigned member of one class.
fn resolve_component(entries: &mut [ImportEntry], members: &[usize]) -> Result<()> {
    let mut taken: Vec<&str> = Vec::new();
    let mut unresolved: Vec<usize> = Vec::new();

    for &i in members {
        let import = &entries[i];
        if import.entry.language.is_empty() {
            unresolved.push(i);
        } else {
            let language = import.entry.language.as_str();
            if taken.contains(&language) {
                return Err(PolidocError::row(format!(
                    "[Item {}] language {language:?} appears twice in one alternate set",
                    import.entry.item_id
                )));
            }
            taken.push(language);
        }
    }

    match unresolved.as_slice() {
        [] => Ok(()),
        &[i] => {
            let import = &entries[i];
            let remainder: Vec<&String> = import
                .language_candidates
                .iter()
                .filter(|code| !taken.contains(&code.as_str()))
                .collect();
            match remainder.as_slice() {
                [code] => {
                    let code = (*code).clone();
                    entries[i].entry.language = code;
                    Ok(())
                }
                [] => Err(PolidocError::row(format!(
                    "[Item {}] cannot determine language",
                    import.entry.item_id
                ))),
                _ => Err(PolidocError::row(format!(
                    "[Item {}] ambiguous language: {} candidates remain",
                    import.entry.item_id,
                    remainder.len()
                ))),
            }
        }
        many => {
            let ids: Vec<&str> = many
                .iter()
                .map(|&i| entries[i].entry.item_id.as_str())
                .collect();
            Err(PolidocError::row(format!(
                "alternate set has {} entries with unresolved language: {}",
                ids.len(),
                ids.join(", ")
            )))
        }
    }
}
