use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::account::AccountCode;
use crate::type_label::fold;

/// The bucket a ledger row lands in. Every row gets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Class {
    AccruedPurchases,
    Bill,
    Payment,
    Adjustments,
    Other,
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Class::AccruedPurchases => write!(f, "accrued"),
            Class::Bill => write!(f, "bill"),
            Class::Payment => write!(f, "payment"),
            Class::Adjustments => write!(f, "adjustments"),
            Class::Other => write!(f, "other"),
        }
    }
}

/// Which account codes a rule accepts. A row with no code is never `In` a set
/// and always `NotIn` one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum AccountMatch {
    In(BTreeSet<AccountCode>),
    NotIn(BTreeSet<AccountCode>),
}

impl AccountMatch {
    pub fn matches(&self, code: Option<AccountCode>) -> bool {
        match self {
            AccountMatch::In(set) => code.is_some_and(|c| set.contains(&c)),
            AccountMatch::NotIn(set) => !code.is_some_and(|c| set.contains(&c)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    pub class: Class,
    pub accounts: AccountMatch,
    /// Canonical type labels (see `TypeCanonicalizer`).
    pub types: BTreeSet<String>,
}

impl ClassRule {
    pub fn new(class: Class, accounts: AccountMatch, types: &[&str]) -> Self {
        ClassRule {
            class,
            accounts,
            types: types.iter().map(|t| fold(t)).collect(),
        }
    }

    pub fn matches(&self, account: Option<AccountCode>, type_label: &str) -> bool {
        self.types.contains(type_label) && self.accounts.matches(account)
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Rule {0} assigns the fallback class 'other'")]
    FallbackClass(usize),
    #[error("Rule book is empty")]
    Empty,
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(rename = "rule", default)]
    rules: Vec<ClassRule>,
}

fn codes(list: &[u32]) -> BTreeSet<AccountCode> {
    list.iter().copied().map(AccountCode).collect()
}

pub const ACCRUED_ACCOUNTS: &[u32] = &[21109, 21142];
pub const BILL_ACCOUNTS: &[u32] = &[21142, 21110, 21117];
pub const PAYMENT_ACCOUNTS: &[u32] = &[13150, 21110, 21117];

/// An ordered list of rules. The first rule that matches a row decides its
/// class; a row no rule matches is [`Class::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBook {
    rules: Vec<ClassRule>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleBook {
    /// Rules are evaluated in the order given.
    pub fn new(rules: Vec<ClassRule>) -> Self {
        RuleBook { rules }
    }

    /// The AP analysis rules: Payment, then Accrued Purchases, then Bill, then
    /// Adjustments. Several account/type pairs satisfy more than one rule, so
    /// this order is significant.
    pub fn standard() -> Self {
        RuleBook::new(vec![
            ClassRule::new(
                Class::Payment,
                AccountMatch::In(codes(PAYMENT_ACCOUNTS)),
                &["bill payment", "vendor prepayment", "vendor prepayment application"],
            ),
            ClassRule::new(
                Class::AccruedPurchases,
                AccountMatch::In(codes(ACCRUED_ACCOUNTS)),
                &["vendor bill", "bill credit", "item receipt"],
            ),
            ClassRule::new(
                Class::Bill,
                AccountMatch::In(codes(BILL_ACCOUNTS)),
                &["vendor bill", "bill credit", "vendor credit", "journal"],
            ),
            ClassRule::new(
                Class::Adjustments,
                AccountMatch::NotIn(codes(BILL_ACCOUNTS)),
                &["journal"],
            ),
        ])
    }

    /// Load a rule book from TOML:
    ///
    /// ```toml
    /// [[rule]]
    /// class = "payment"
    /// accounts = { kind = "in", codes = [13150] }
    /// types = ["Bill Payment"]
    /// ```
    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        if file.rules.is_empty() {
            return Err(RuleError::Empty);
        }
        if let Some(idx) = file.rules.iter().position(|r| r.class == Class::Other) {
            return Err(RuleError::FallbackClass(idx));
        }
        let rules = file
            .rules
            .into_iter()
            .map(|r| ClassRule {
                types: r.types.iter().map(|t| fold(t)).collect(),
                ..r
            })
            .collect();
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[ClassRule] {
        &self.rules
    }

    /// `type_label` must already be canonical.
    pub fn classify(&self, account: Option<AccountCode>, type_label: &str) -> Class {
        self.rules
            .iter()
            .find(|r| r.matches(account, type_label))
            .map_or(Class::Other, |r| r.class)
    }
}
