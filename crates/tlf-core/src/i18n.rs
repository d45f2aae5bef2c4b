//! Static i18n lookup tables: languages, deployment modes, user roles.
//!
//! Plain enums with match-backed tables; lookups for unknown keys fail
//! with `Error::NotFound`.

use crate::{errors::Error, Result};

/// Supported application languages (ISO 639-1 code + native display name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Ru,
    Uz,
    Zh,
    Es,
    Fr,
    De,
    Tr,
    Ja,
    Ko,
    Pt,
    It,
    Ar,
    Hi,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::En,
        Language::Ru,
        Language::Uz,
        Language::Zh,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Tr,
        Language::Ja,
        Language::Ko,
        Language::Pt,
        Language::It,
        Language::Ar,
        Language::Hi,
    ];

    /// Two-letter ISO 639-1 code (e.g. "en").
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Uz => "uz",
            Language::Zh => "zh",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Tr => "tr",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Pt => "pt",
            Language::It => "it",
            Language::Ar => "ar",
            Language::Hi => "hi",
        }
    }

    /// Native display name, for UI language pickers.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Русский",
            Language::Uz => "O'zbekcha",
            Language::Zh => "中文",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::Tr => "Türkçe",
            Language::Ja => "日本語",
            Language::Ko => "한국어",
            Language::Pt => "Português",
            Language::It => "Italiano",
            Language::Ar => "العربية",
            Language::Hi => "हिन्दी",
        }
    }

    /// Look up a language by ISO code, case-insensitively.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::NotFound(format!("unknown language code: {code}")))
    }
}

/// Deployment mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Test,
    Prod,
}

impl Mode {
    /// Localized description; translated for En/Ru/Uz only.
    pub fn description(self, language: Language) -> Result<&'static str> {
        let text = match (self, language) {
            (Mode::Test, Language::En) => "Test mode",
            (Mode::Test, Language::Ru) => "Тестовый режим",
            (Mode::Test, Language::Uz) => "Test rejimi",
            (Mode::Prod, Language::En) => "Production mode",
            (Mode::Prod, Language::Ru) => "Режим продакшн",
            (Mode::Prod, Language::Uz) => "Ishlab chiqarish rejimi",
            _ => {
                return Err(Error::NotFound(format!(
                    "no {self:?} description for language {}",
                    language.code()
                )))
            }
        };
        Ok(text)
    }
}

/// User role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Developer,
}

impl Role {
    /// Localized description; translated for En/Ru/Uz only.
    pub fn description(self, language: Language) -> Result<&'static str> {
        let text = match (self, language) {
            (Role::User, Language::En) => "User",
            (Role::User, Language::Ru) => "Пользователь",
            (Role::User, Language::Uz) => "Foydalanuvchi",
            (Role::Developer, Language::En) => "Developer",
            (Role::Developer, Language::Ru) => "Разработчик",
            (Role::Developer, Language::Uz) => "Developer foydalanuvchi",
            _ => {
                return Err(Error::NotFound(format!(
                    "no {self:?} description for language {}",
                    language.code()
                )))
            }
        };
        Ok(text)
    }
}
