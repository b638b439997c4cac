//! Document lookup keys.
//!
//! Operators either type the shipping document number or scan the 44-digit
//! NF-e access key printed on the fiscal note. The access key embeds the
//! invoice number at a fixed position:
//!
//! ```text
//! cUF(2) AAMM(4) CNPJ(14) mod(2) serie(3) nNF(9) ...
//!                                          ^ offset 25
//! ```

use std::fmt;

use crate::CheckError;

const ACCESS_KEY_LEN: usize = 44;
const INVOICE_NUMBER: std::ops::Range<usize> = 25..34;

/// The key used to query the order API and to label the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub lookup: String,
    pub display: String,
}

impl DocumentKey {
    /// Derive the lookup key from operator input.
    pub fn parse(input: &str) -> Result<Self, CheckError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CheckError::EmptyDocument);
        }

        let key = match invoice_number(input) {
            Some(number) => number,
            None => input.to_string(),
        };
        Ok(Self {
            lookup: key.clone(),
            display: key,
        })
    }

    /// True if `input` has the shape of an NF-e access key.
    pub fn is_access_key(input: &str) -> bool {
        input.len() == ACCESS_KEY_LEN && input.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

fn invoice_number(input: &str) -> Option<String> {
    if !DocumentKey::is_access_key(input) {
        return None;
    }
    // Leading zeros go away with the integer parse.
    let digits = &input[INVOICE_NUMBER];
    digits.parse::<u64>().ok().map(|n| n.to_string())
}
