//! Pluggable surface-form rendering for Entities.
//!
//! A [`Linguist`] turns an Entity's canonical label into the inflected text
//! that should actually appear at a given Mention site. Implementations may
//! range from a verbatim passthrough (the only one provided here) to
//! language-specific morphological engines, but every implementation must be
//! deterministic: probabilistic guesses are not allowed, so a caller can
//! always explain why a given surface form was produced.

use littera_core::EntityLabel;
use serde_json::Value;

/// The rendered result of asking a [`Linguist`] for a Mention's surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceForm {
    pub text: String,
    pub explanation: String,
    pub warnings: Vec<String>,
}

/// Strategy for producing the surface form of an Entity mention.
pub trait Linguist: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn surface_form(
        &self,
        properties: &Value,
        label: &EntityLabel,
        features: &Value,
        language: &str,
        context: Option<&str>,
    ) -> SurfaceForm;
}

/// Default [`Linguist`]: returns the label's base text unchanged, regardless
/// of grammatical features. No inflection, no guessing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughLinguist;

impl Linguist for PassthroughLinguist {
    fn surface_form(
        &self,
        _properties: &Value,
        label: &EntityLabel,
        _features: &Value,
        language: &str,
        _context: Option<&str>,
    ) -> SurfaceForm {
        let mut warnings = Vec::new();
        if label.language != language {
            warnings.push(format!(
                "requested language '{}' does not match label language '{}'",
                language, label.language
            ));
        }
        SurfaceForm {
            text: label.text.clone(),
            explanation: "no inflection applied; base label returned verbatim".to_string(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn label(language: &str, text: &str) -> EntityLabel {
        EntityLabel {
            entity_id: uuid::Uuid::new_v4(),
            language: language.to_string(),
            text: text.to_string(),
            aliases: vec![],
        }
    }

    #[test]
    fn passthrough_returns_base_label_text() {
        let linguist = PassthroughLinguist;
        let result = linguist.surface_form(&json!({}), &label("en", "Paris"), &json!({}), "en", None);
        assert_eq!(result.text, "Paris");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn passthrough_warns_on_language_mismatch() {
        let linguist = PassthroughLinguist;
        let result = linguist.surface_form(&json!({}), &label("en", "Paris"), &json!({}), "fr", None);
        assert_eq!(result.text, "Paris");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn passthrough_ignores_grammatical_features() {
        let linguist = PassthroughLinguist;
        let a = linguist.surface_form(&json!({}), &label("en", "Paris"), &json!({"case": "dative"}), "en", None);
        let b = linguist.surface_form(&json!({}), &label("en", "Paris"), &json!({}), "en", None);
        assert_eq!(a.text, b.text);
    }
}
