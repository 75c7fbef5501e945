//! HTTP middleware.

pub mod language;

pub use language::{
    AcceptLanguageNegotiator, CookieNegotiator, LanguageNegotiator, ResolvedLanguage,
    negotiate_language,
};
