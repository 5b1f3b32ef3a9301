use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document language. Selects the font stack used for export and print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Tamil,
    Telugu,
    Malayalam,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Tamil,
        Language::Telugu,
        Language::Malayalam,
        Language::Hindi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Tamil => "tamil",
            Language::Telugu => "telugu",
            Language::Malayalam => "malayalam",
            Language::Hindi => "hindi",
        }
    }

    /// BCP 47 tag for the `lang` attribute.
    pub fn html_lang(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Malayalam => "ml",
            Language::Hindi => "hi",
        }
    }

    pub fn font_stack(self) -> &'static str {
        match self {
            Language::English => "'Inter', 'Segoe UI', Arial, sans-serif",
            Language::Tamil => "'Noto Sans Tamil', 'Latha', 'Vijaya', sans-serif",
            Language::Telugu => "'Noto Sans Telugu', 'Gautami', 'Vani', sans-serif",
            Language::Malayalam => "'Noto Sans Malayalam', 'Kartika', 'AnjaliOldLipi', sans-serif",
            Language::Hindi => "'Noto Sans Devanagari', 'Mangal', 'Kokila', sans-serif",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Language::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown language: {s}"))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
