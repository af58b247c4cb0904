//! The seven emirates with their ISO 3166-2:AE subdivision codes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emirate {
    AbuDhabi,
    Ajman,
    Dubai,
    Fujairah,
    RasAlKhaimah,
    Sharjah,
    UmmAlQuwain,
}

struct EmirateInfo {
    emirate: Emirate,
    code: &'static str,
    english: &'static str,
    arabic: &'static str,
    aliases: &'static [&'static str],
}

static EMIRATES: &[EmirateInfo] = &[
    EmirateInfo {
        emirate: Emirate::AbuDhabi,
        code: "AE-AZ",
        english: "Abu Dhabi",
        arabic: "أبوظبي",
        aliases: &["abu dhabi", "abudhabi", "az", "ae-az"],
    },
    EmirateInfo {
        emirate: Emirate::Ajman,
        code: "AE-AJ",
        english: "Ajman",
        arabic: "عجمان",
        aliases: &["ajman", "aj", "ae-aj"],
    },
    EmirateInfo {
        emirate: Emirate::Dubai,
        code: "AE-DU",
        english: "Dubai",
        arabic: "دبي",
        aliases: &["dubai", "du", "ae-du"],
    },
    EmirateInfo {
        emirate: Emirate::Fujairah,
        code: "AE-FU",
        english: "Fujairah",
        arabic: "الفجيرة",
        aliases: &["fujairah", "fu", "ae-fu"],
    },
    EmirateInfo {
        emirate: Emirate::RasAlKhaimah,
        code: "AE-RK",
        english: "Ras Al Khaimah",
        arabic: "رأس الخيمة",
        aliases: &["ras al khaimah", "ras al-khaimah", "rak", "rk", "ae-rk"],
    },
    EmirateInfo {
        emirate: Emirate::Sharjah,
        code: "AE-SH",
        english: "Sharjah",
        arabic: "الشارقة",
        aliases: &["sharjah", "sh", "ae-sh"],
    },
    EmirateInfo {
        emirate: Emirate::UmmAlQuwain,
        code: "AE-UQ",
        english: "Umm Al Quwain",
        arabic: "أم القيوين",
        aliases: &["umm al quwain", "umm al-quwain", "uaq", "uq", "ae-uq"],
    },
];

impl Emirate {
    fn info(&self) -> &'static EmirateInfo {
        // Every variant has exactly one table entry (checked in tests).
        EMIRATES
            .iter()
            .find(|e| e.emirate == *self)
            .unwrap_or(&EMIRATES[0])
    }

    /// ISO 3166-2 code, e.g. `AE-DU`.
    pub fn code(&self) -> &'static str {
        self.info().code
    }

    pub fn english_name(&self) -> &'static str {
        self.info().english
    }

    pub fn arabic_name(&self) -> &'static str {
        self.info().arabic
    }

    /// Resolve a free-text emirate name or code, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim().to_lowercase();
        EMIRATES
            .iter()
            .find(|e| e.aliases.contains(&needle.as_str()) || e.arabic == value.trim())
            .map(|e| e.emirate)
    }
}
