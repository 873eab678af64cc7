use std::collections::HashMap;

/// Built-in spelling variants of the transaction types found in AP extracts.
/// Keys and values are already folded (see [`TypeCanonicalizer::canonicalize`]).
pub const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("bill", "vendor bill"),
    ("vendorbill", "vendor bill"),
    ("journal entry", "journal"),
    ("itemreceipt", "item receipt"),
    ("billpayment", "bill payment"),
    ("vendorprepayment", "vendor prepayment"),
    ("vendorprepayment application", "vendor prepayment application"),
    ("vendorprepaymentapplication", "vendor prepayment application"),
];

/// Maps free-text type labels onto the canonical vocabulary the rule book uses.
///
/// The synonym table is owned configuration. Extending it produces a new
/// canonicalizer and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCanonicalizer {
    synonyms: HashMap<String, String>,
}

impl Default for TypeCanonicalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SYNONYMS.iter().copied())
    }
}

impl TypeCanonicalizer {
    pub fn new<K, V>(synonyms: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let synonyms = synonyms
            .into_iter()
            .map(|(k, v)| (fold(k.as_ref()), fold(v.as_ref())))
            .collect();
        Self { synonyms }
    }

    /// A copy of this canonicalizer with `extra` layered on top.
    pub fn with_synonyms<K, V>(&self, extra: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut synonyms = self.synonyms.clone();
        synonyms.extend(
            extra
                .into_iter()
                .map(|(k, v)| (fold(k.as_ref()), fold(v.as_ref()))),
        );
        Self { synonyms }
    }

    /// Trim, lowercase, collapse inner whitespace, then apply the synonym table.
    /// Labels outside the table come back folded but otherwise unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        let folded = fold(raw);
        match self.synonyms.get(&folded) {
            Some(canonical) => canonical.clone(),
            None => folded,
        }
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

pub(crate) fn fold(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
