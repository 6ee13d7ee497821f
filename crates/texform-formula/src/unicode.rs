// this_file: crates/texform-formula/src/unicode.rs

//! Unicode block classification used to pick external fonts for text runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use texform_core::{Result, TexError};

/// Unicode blocks that can carry an external font mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnicodeBlock {
    BasicLatin,
    Latin1Supplement,
    LatinExtended,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Devanagari,
    Thai,
    Hangul,
    Hiragana,
    Katakana,
    CjkUnified,
    MathematicalOperators,
    Other,
}

impl UnicodeBlock {
    pub fn of(ch: char) -> Self {
        match ch as u32 {
            0x0000..=0x007f => UnicodeBlock::BasicLatin,
            0x0080..=0x00ff => UnicodeBlock::Latin1Supplement,
            0x0100..=0x024f | 0x1e00..=0x1eff => UnicodeBlock::LatinExtended,
            0x0370..=0x03ff | 0x1f00..=0x1fff => UnicodeBlock::Greek,
            0x0400..=0x052f => UnicodeBlock::Cyrillic,
            0x0590..=0x05ff => UnicodeBlock::Hebrew,
            0x0600..=0x06ff | 0x0750..=0x077f => UnicodeBlock::Arabic,
            0x0900..=0x097f => UnicodeBlock::Devanagari,
            0x0e00..=0x0e7f => UnicodeBlock::Thai,
            0x1100..=0x11ff | 0xac00..=0xd7af => UnicodeBlock::Hangul,
            0x3040..=0x309f => UnicodeBlock::Hiragana,
            0x30a0..=0x30ff => UnicodeBlock::Katakana,
            0x4e00..=0x9fff | 0x3400..=0x4dbf => UnicodeBlock::CjkUnified,
            0x2200..=0x22ff => UnicodeBlock::MathematicalOperators,
            _ => UnicodeBlock::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnicodeBlock::BasicLatin => "basic_latin",
            UnicodeBlock::Latin1Supplement => "latin1_supplement",
            UnicodeBlock::LatinExtended => "latin_extended",
            UnicodeBlock::Greek => "greek",
            UnicodeBlock::Cyrillic => "cyrillic",
            UnicodeBlock::Hebrew => "hebrew",
            UnicodeBlock::Arabic => "arabic",
            UnicodeBlock::Devanagari => "devanagari",
            UnicodeBlock::Thai => "thai",
            UnicodeBlock::Hangul => "hangul",
            UnicodeBlock::Hiragana => "hiragana",
            UnicodeBlock::Katakana => "katakana",
            UnicodeBlock::CjkUnified => "cjk_unified",
            UnicodeBlock::MathematicalOperators => "mathematical_operators",
            UnicodeBlock::Other => "other",
        }
    }
}

impl fmt::Display for UnicodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnicodeBlock {
    type Err = TexError;

    fn from_str(s: &str) -> Result<Self> {
        const ALL: [UnicodeBlock; 15] = [
            UnicodeBlock::BasicLatin,
            UnicodeBlock::Latin1Supplement,
            UnicodeBlock::LatinExtended,
            UnicodeBlock::Greek,
            UnicodeBlock::Cyrillic,
            UnicodeBlock::Hebrew,
            UnicodeBlock::Arabic,
            UnicodeBlock::Devanagari,
            UnicodeBlock::Thai,
            UnicodeBlock::Hangul,
            UnicodeBlock::Hiragana,
            UnicodeBlock::Katakana,
            UnicodeBlock::CjkUnified,
            UnicodeBlock::MathematicalOperators,
            UnicodeBlock::Other,
        ];
        ALL.iter()
            .copied()
            .find(|block| block.name() == s)
            .ok_or_else(|| TexError::configuration(format!("Unknown Unicode block '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_of() {
        assert_eq!(UnicodeBlock::of('a'), UnicodeBlock::BasicLatin);
        assert_eq!(UnicodeBlock::of('é'), UnicodeBlock::Latin1Supplement);
        assert_eq!(UnicodeBlock::of('α'), UnicodeBlock::Greek);
        assert_eq!(UnicodeBlock::of('ж'), UnicodeBlock::Cyrillic);
        assert_eq!(UnicodeBlock::of('漢'), UnicodeBlock::CjkUnified);
        assert_eq!(UnicodeBlock::of('∑'), UnicodeBlock::MathematicalOperators);
        assert_eq!(UnicodeBlock::of('🙂'), UnicodeBlock::Other);
    }

    #[test]
    fn test_name_round_trip() {
        assert_eq!(
            "greek".parse::<UnicodeBlock>().unwrap(),
            UnicodeBlock::Greek
        );
        assert!("klingon".parse::<UnicodeBlock>().is_err());
    }
}
