//! PICTURE character-string validation

use crate::types::UsageFormat;
use std::fmt;
use thiserror::Error;

/// Largest number of digit positions a numeric picture may declare
pub const MAX_DIGITS: u32 = 31;

/// Largest number of character positions a picture may declare
pub const MAX_LENGTH: u32 = 134_217_727;

/// Reasons a PICTURE character-string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PictureError {
    /// Nothing but blanks
    #[error("PICTURE character-string is empty")]
    Empty,

    /// Character that is not a picture symbol
    #[error("invalid character '{0}' in PICTURE character-string")]
    InvalidCharacter(char),

    /// `(` without `)` or a repetition factor with no symbol before it
    #[error("unbalanced repetition factor in PICTURE character-string")]
    UnbalancedParenthesis,

    /// Repetition factor that is not a positive integer
    #[error("invalid repetition factor '{0}'")]
    InvalidRepetition(String),

    /// `S` anywhere but first, or more than once
    #[error("symbol 'S' may appear only once, as the leftmost symbol")]
    MisplacedSign,

    /// `V` more than once
    #[error("symbol 'V' may appear only once")]
    MultipleDecimalPoints,

    /// Numeric picture wider than [`MAX_DIGITS`]
    #[error("numeric PICTURE declares {digits} digits, at most {MAX_DIGITS} are allowed")]
    TooManyDigits {
        /// Declared digit positions
        digits: u32,
    },

    /// Picture wider than [`MAX_LENGTH`] character positions
    #[error("PICTURE character-string declares more than {MAX_LENGTH} character positions")]
    TooLong,
}

/// Category of data a picture describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureCategory {
    /// `A` and `B` only
    Alphabetic,
    /// `9`, `S`, `V`, `P`
    Numeric,
    /// Numeric with editing symbols
    NumericEdited,
    /// `X`, or a mix of `A` and `9`
    Alphanumeric,
    /// Alphanumeric with insertion symbols
    AlphanumericEdited,
    /// `N`
    National,
    /// `G`
    Dbcs,
}

/// A validated PICTURE character-string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    text: String,
    /// Symbols with their repetition factors, in order
    symbols: Vec<(&'static str, u32)>,
    category: PictureCategory,
    digits: u32,
    scale: u32,
    signed: bool,
    length: u32,
}

impl Picture {
    /// Validate `text` and compute its category and size
    ///
    /// # Errors
    ///
    /// Returns a [`PictureError`] when the string is not a well-formed picture.
    pub fn parse(text: &str) -> Result<Self, PictureError> {
        let source = text.trim().to_ascii_uppercase();
        if source.is_empty() {
            return Err(PictureError::Empty);
        }

        let chars: Vec<char> = source.chars().collect();
        let mut symbols: Vec<(&'static str, u32)> = Vec::new();
        let mut cursor = 0;
        while cursor < chars.len() {
            let current = chars[cursor];
            let symbol = match (current, chars.get(cursor + 1)) {
                ('C', Some('R')) => {
                    cursor += 2;
                    "CR"
                }
                ('D', Some('B')) => {
                    cursor += 2;
                    "DB"
                }
                ('(', _) => return Err(PictureError::UnbalancedParenthesis),
                _ => {
                    cursor += 1;
                    symbol_text(current).ok_or(PictureError::InvalidCharacter(current))?
                }
            };

            let mut count = 1;
            if chars.get(cursor) == Some(&'(') {
                let close = chars[cursor..]
                    .iter()
                    .position(|character| *character == ')')
                    .ok_or(PictureError::UnbalancedParenthesis)?;
                let factor: String = chars[cursor + 1..cursor + close].iter().collect();
                count = factor
                    .parse::<u32>()
                    .ok()
                    .filter(|value| *value > 0)
                    .ok_or_else(|| PictureError::InvalidRepetition(factor.clone()))?;
                cursor += close + 1;
            }
            symbols.push((symbol, count));
        }

        let declared = symbols.iter().try_fold(0_u32, |declared, (symbol, count)| {
            count.checked_mul(symbol.len() as u32)?.checked_add(declared)
        });
        if declared.is_none_or(|declared| declared > MAX_LENGTH) {
            return Err(PictureError::TooLong);
        }

        Self::from_symbols(text, symbols)
    }

    /// Sums below never overflow: `parse` bounds the declared positions by
    /// [`MAX_LENGTH`]
    fn from_symbols(text: &str, symbols: Vec<(&'static str, u32)>) -> Result<Self, PictureError> {
        let total = |wanted: &[&str]| -> u32 {
            symbols
                .iter()
                .filter(|(symbol, _)| wanted.contains(symbol))
                .map(|(_, count)| count)
                .sum()
        };
        let has = |wanted: &[&str]| total(wanted) > 0;

        let sign_count = total(&["S"]);
        if sign_count > 1 || (sign_count == 1 && symbols.first().map(|(symbol, _)| *symbol) != Some("S")) {
            return Err(PictureError::MisplacedSign);
        }
        if total(&["V"]) > 1 {
            return Err(PictureError::MultipleDecimalPoints);
        }

        let insertion = has(&["B", "0", "/"]);
        let numeric_editing = has(&["Z", "*", "+", "-", ",", ".", "$", "CR", "DB", "E"]);
        let category = if has(&["G"]) {
            PictureCategory::Dbcs
        } else if has(&["N"]) {
            PictureCategory::National
        } else if has(&["X"]) || (has(&["A"]) && has(&["9"])) {
            if insertion {
                PictureCategory::AlphanumericEdited
            } else {
                PictureCategory::Alphanumeric
            }
        } else if has(&["A"]) {
            PictureCategory::Alphabetic
        } else if numeric_editing || insertion {
            PictureCategory::NumericEdited
        } else {
            PictureCategory::Numeric
        };

        let numeric = matches!(
            category,
            PictureCategory::Numeric | PictureCategory::NumericEdited
        );
        let digits = if numeric { total(&["9", "Z", "*", "P"]) } else { 0 };
        if digits > MAX_DIGITS {
            return Err(PictureError::TooManyDigits { digits });
        }

        let mut scale = 0;
        let mut after_point = false;
        let mut length = 0;
        for (symbol, count) in &symbols {
            match *symbol {
                "V" => after_point = true,
                "9" | "P" if after_point => scale += count,
                _ => {}
            }
            if !matches!(*symbol, "S" | "V" | "P") {
                length += count * symbol.len() as u32;
            }
        }

        let signed = sign_count == 1 || has(&["+", "-", "CR", "DB"]);
        Ok(Self {
            text: text.trim().to_owned(),
            symbols,
            category,
            digits,
            scale,
            signed,
            length,
        })
    }

    /// The string as written
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The string with every repetition factor expanded
    #[must_use]
    pub fn normalized(&self) -> String {
        self.symbols
            .iter()
            .map(|(symbol, count)| symbol.repeat(*count as usize))
            .collect()
    }

    /// Data category
    #[must_use]
    pub fn category(&self) -> PictureCategory {
        self.category
    }

    /// Digit positions of a numeric picture
    #[must_use]
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Digit positions right of the assumed decimal point
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Whether the picture carries a sign
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Character positions, not counting `S`, `V` and `P`
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Storage size in bytes under `usage`
    #[must_use]
    pub fn size(&self, usage: UsageFormat, sign_separate: bool) -> u32 {
        let separate_sign = u32::from(sign_separate && self.category == PictureCategory::Numeric && self.signed);
        match usage {
            UsageFormat::Comp3 | UsageFormat::PackedDecimal => self.digits / 2 + 1,
            UsageFormat::Binary | UsageFormat::Comp | UsageFormat::Comp4 | UsageFormat::Comp5 => {
                match self.digits {
                    0..=4 => 2,
                    5..=9 => 4,
                    _ => 8,
                }
            }
            UsageFormat::National => 2 * (self.length + separate_sign),
            UsageFormat::Display1 => 2 * self.length,
            _ if self.category == PictureCategory::National || self.category == PictureCategory::Dbcs => {
                2 * self.length
            }
            other => other.fixed_size().unwrap_or(self.length + separate_sign),
        }
    }
}

impl fmt::Display for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn symbol_text(character: char) -> Option<&'static str> {
    let text = match character {
        'A' => "A",
        'B' => "B",
        'E' => "E",
        'G' => "G",
        'N' => "N",
        'P' => "P",
        'S' => "S",
        'V' => "V",
        'X' => "X",
        'Z' => "Z",
        '9' => "9",
        '0' => "0",
        '1' => "1",
        '/' => "/",
        ',' => ",",
        '.' => ".",
        '+' => "+",
        '-' => "-",
        '*' => "*",
        '$' => "$",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Picture {
        Picture::parse(text).expect("picture should be valid")
    }

    #[test]
    fn test_repetition_is_expanded() {
        let picture = parse("X(3)");
        assert_eq!(picture.normalized(), "XXX");
        assert_eq!(picture.category(), PictureCategory::Alphanumeric);
        assert_eq!(picture.length(), 3);
    }

    #[test]
    fn test_signed_numeric_with_scale() {
        let picture = parse("S9(5)V99");
        assert_eq!(picture.category(), PictureCategory::Numeric);
        assert_eq!(picture.digits(), 7);
        assert_eq!(picture.scale(), 2);
        assert!(picture.is_signed());
        assert_eq!(picture.length(), 7);
        assert_eq!(picture.size(UsageFormat::Display, true), 8);
        assert_eq!(picture.size(UsageFormat::PackedDecimal, false), 4);
        assert_eq!(picture.size(UsageFormat::Comp, false), 4);
    }

    #[test]
    fn test_edited_categories() {
        assert_eq!(parse("ZZ,ZZ9.99").category(), PictureCategory::NumericEdited);
        assert_eq!(parse("XXBXX").category(), PictureCategory::AlphanumericEdited);
        assert_eq!(parse("A(4)").category(), PictureCategory::Alphabetic);
        assert_eq!(parse("N(4)").size(UsageFormat::National, false), 8);
        assert_eq!(parse("9(4)CR").length(), 6);
    }

    #[test]
    fn test_rejected_pictures() {
        assert_eq!(Picture::parse("  "), Err(PictureError::Empty));
        assert_eq!(Picture::parse("X(3"), Err(PictureError::UnbalancedParenthesis));
        assert_eq!(Picture::parse("X(0)"), Err(PictureError::InvalidRepetition("0".to_owned())));
        assert_eq!(Picture::parse("9S9"), Err(PictureError::MisplacedSign));
        assert_eq!(Picture::parse("9V9V9"), Err(PictureError::MultipleDecimalPoints));
        assert_eq!(Picture::parse("X#"), Err(PictureError::InvalidCharacter('#')));
        assert_eq!(
            Picture::parse("9(32)"),
            Err(PictureError::TooManyDigits { digits: 32 })
        );
    }

    #[test]
    fn test_oversized_pictures_are_rejected() {
        assert_eq!(Picture::parse("9(4294967295)9"), Err(PictureError::TooLong));
        assert_eq!(Picture::parse("X(2000000000)"), Err(PictureError::TooLong));
        assert_eq!(Picture::parse("CR(2147483648)"), Err(PictureError::TooLong));
        assert_eq!(Picture::parse("X(134217727)").map(|picture| picture.length()), Ok(MAX_LENGTH));
    }
}
