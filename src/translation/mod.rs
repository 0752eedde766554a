//! Translation module for vox-relay
//!
//! This module handles text translation via the Google Translate gtx endpoint.

mod google;

pub use google::{GoogleTranslator, TranslationError};
