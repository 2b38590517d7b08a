//! Localized texts of the email verification page
//!
//! The page is opened straight from a mailbox, so it is the only response
//! rendered for a person rather than for the web client. Spanish is the
//! default; English is used when `Accept-Language` prefers it.

use actix_web::{http::header, HttpRequest};

use sigma_core::VerificationOutcome;

use crate::dto::VerificationPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    /// Detect language preference from the Accept-Language header
    pub fn from_request(req: &HttpRequest) -> Self {
        req.headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_accept_language)
            .unwrap_or_default()
    }

    /// Pick the supported language with the highest quality value
    ///
    /// Example: "en-US,en;q=0.9,es;q=0.8" selects English.
    pub fn from_accept_language(header: &str) -> Self {
        let mut preferred = Language::Spanish;
        let mut max_quality = 0.0_f32;

        for entry in header.split(',') {
            let mut parts = entry.trim().split(';');
            let tag = parts.next().unwrap_or_default().trim().to_lowercase();
            let quality = parts
                .find_map(|param| param.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let language = if tag.starts_with("es") {
                Language::Spanish
            } else if tag.starts_with("en") {
                Language::English
            } else {
                continue;
            };

            if quality > max_quality {
                preferred = language;
                max_quality = quality;
            }
        }

        preferred
    }
}

/// Localized verification page for an outcome
pub fn verification_page(outcome: VerificationOutcome, lang: Language) -> VerificationPage {
    let (status, es, en) = match outcome {
        VerificationOutcome::Verified => (
            "verified",
            "Tu cuenta ha sido verificada. Ya puedes iniciar sesión.",
            "Your account has been verified. You can log in now.",
        ),
        VerificationOutcome::AlreadyVerified => (
            "already_verified",
            "Esta cuenta ya estaba verificada.",
            "This account is verified already.",
        ),
        VerificationOutcome::Failed => (
            "failed",
            "El enlace de verificación no es válido o ha expirado. Solicita uno nuevo.",
            "The verification link is invalid or has expired. Request a new one.",
        ),
    };

    VerificationPage {
        status,
        message: match lang {
            Language::Spanish => es,
            Language::English => en,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanish_is_the_default() {
        assert_eq!(Language::from_accept_language(""), Language::Spanish);
        assert_eq!(Language::from_accept_language("fr-FR,de;q=0.5"), Language::Spanish);
        assert_eq!(Language::from_accept_language("es-CU"), Language::Spanish);
    }

    #[test]
    fn test_quality_values_decide() {
        assert_eq!(
            Language::from_accept_language("en-US,en;q=0.9,es;q=0.8"),
            Language::English
        );
        assert_eq!(
            Language::from_accept_language("en;q=0.4, es-ES;q=0.7"),
            Language::Spanish
        );
        assert_eq!(Language::from_accept_language("fr, en;q=0.1"), Language::English);
    }

    #[test]
    fn test_verification_page() {
        let page = verification_page(VerificationOutcome::Verified, Language::English);
        assert_eq!(page.status, "verified");
        assert!(page.message.starts_with("Your account"));

        let page = verification_page(VerificationOutcome::Failed, Language::Spanish);
        assert_eq!(page.status, "failed");
        assert!(page.message.contains("expirado"));
    }
}
