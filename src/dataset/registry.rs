use std::collections::HashMap;

/// Fold a province or sector name into its lookup key.
///
/// Lowercases with Turkish-aware folding, strips diacritics, treats `-_./` as spaces
/// and collapses whitespace: `"  Şanlı-Urfa "` -> `"sanli urfa"`.
pub fn lookup_key(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'İ' | 'I' | 'ı' | 'i' | 'Î' | 'î' => folded.push('i'),
            'Ş' | 'ş' => folded.push('s'),
            'Ğ' | 'ğ' => folded.push('g'),
            'Ü' | 'ü' | 'Û' | 'û' => folded.push('u'),
            'Ö' | 'ö' => folded.push('o'),
            'Ç' | 'ç' => folded.push('c'),
            'Â' | 'â' => folded.push('a'),
            '-' | '_' | '.' | '/' => folded.push(' '),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result of registering an alias in a [`NameIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasStatus {
    /// The alias now resolves to the target.
    Added,
    /// The alias already folds to the target's own key.
    Redundant,
    /// The alias key already resolves to a different entry, which is kept.
    Conflict(usize),
    /// The target is not in this index.
    UnknownTarget,
}

/// Resolves user-supplied names to positions in a canonical name list.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    names: Vec<String>,
    by_key: HashMap<String, usize>,
}

impl NameIndex {
    /// Build an index over canonical names.
    ///
    /// Returns the first name whose lookup key collides with an earlier one.
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        let mut by_key = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if by_key.insert(lookup_key(name), idx).is_some() {
                return Err(name.clone());
            }
        }
        Ok(Self { names, by_key })
    }

    /// Register an alternative spelling for an already indexed name.
    ///
    /// An existing key is never overwritten.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) -> AliasStatus {
        let Some(idx) = self.by_key.get(&lookup_key(canonical)).copied() else {
            return AliasStatus::UnknownTarget;
        };
        match self.by_key.get(&lookup_key(alias)).copied() {
            Some(existing) if existing == idx => AliasStatus::Redundant,
            Some(existing) => AliasStatus::Conflict(existing),
            None => {
                self.by_key.insert(lookup_key(alias), idx);
                AliasStatus::Added
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.by_key.get(&lookup_key(name)).copied()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
