use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The five-digit general-ledger code at the front of an account field,
/// e.g. `21142` in `"21142-AP Accrual"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCode(pub u32);

fn leading_code() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\s*(\d{5})").expect("invalid regex"))
}

impl AccountCode {
    /// Pull the leading five-digit code out of a free-text account field.
    /// Anything without one has no code and never satisfies an account rule.
    pub fn extract(text: &str) -> Option<AccountCode> {
        leading_code()
            .captures(text)
            .and_then(|c| c[1].parse().ok())
            .map(AccountCode)
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl From<u32> for AccountCode {
    fn from(code: u32) -> Self {
        AccountCode(code)
    }
}
