//! Form input for adding and editing beers.
//!
//! Adding is strict: a draft is checked field by field before anything is
//! sent, and every bad field is reported. Editing is lenient: unparsable
//! numbers become `0.0` and the server has the final word.

use crate::error::{Field, ValidationErrors};
use crate::types::{Beer, DEFAULT_PICTURE_URL, UNKNOWN_USER};

/// Style recorded when a new beer is added without one.
pub const DEFAULT_STYLE: &str = "Pilsner";

/// Raw text of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeerDraft {
    pub name: String,
    pub brewery: String,
    pub style: String,
    pub abv: String,
    pub volume: String,
}

impl BeerDraft {
    /// Prefill an edit form from an existing beer.
    pub fn from_beer(beer: &Beer) -> Self {
        Self {
            name: beer.name.clone(),
            brewery: beer.brewery.clone(),
            style: beer.style.clone(),
            abv: beer.abv.to_string(),
            volume: beer.volume.to_string(),
        }
    }

    /// Check the draft and build an unsaved beer owned by `user`.
    ///
    /// `None` means nobody is signed in; the beer is then recorded under
    /// [`UNKNOWN_USER`].
    pub fn validate(&self, user: Option<&str>) -> Result<Beer, ValidationErrors> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push((Field::Name, "name is required".to_string()));
        }
        let abv = required_number(&self.abv, Field::Abv, &mut errors);
        let volume = required_number(&self.volume, Field::Volume, &mut errors);

        let (Some(abv), Some(volume)) = (abv, volume) else {
            return Err(ValidationErrors(errors));
        };
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        let style = if self.style.is_empty() {
            DEFAULT_STYLE.to_string()
        } else {
            self.style.clone()
        };

        Ok(Beer {
            id: 0,
            user: user.unwrap_or(UNKNOWN_USER).to_string(),
            brewery: self.brewery.clone(),
            name: self.name.clone(),
            style,
            abv,
            volume,
            picture_url: DEFAULT_PICTURE_URL.to_string(),
            how_many: 1,
        })
    }

    /// Apply edited fields onto `original`, keeping its identity and the
    /// fields the form does not show.
    pub fn apply_to(&self, original: &Beer) -> Beer {
        Beer {
            id: original.id,
            user: original.user.clone(),
            brewery: self.brewery.clone(),
            name: self.name.clone(),
            style: self.style.clone(),
            abv: self.abv.trim().parse().unwrap_or(0.0),
            volume: self.volume.trim().parse().unwrap_or(0.0),
            picture_url: original.picture_url.clone(),
            how_many: original.how_many,
        }
    }
}

fn required_number(raw: &str, field: Field, errors: &mut Vec<(Field, String)>) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push((field, format!("{} is required", field.label())));
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.push((field, format!("{} must be a number", field.label())));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, abv: &str, volume: &str) -> BeerDraft {
        BeerDraft {
            name: name.to_string(),
            brewery: "Carlsberg".to_string(),
            abv: abv.to_string(),
            volume: volume.to_string(),
            ..BeerDraft::default()
        }
    }

    #[test]
    fn valid_draft_becomes_unsaved_beer() {
        let beer = draft("Pils", "4.6", " 33 ").validate(Some("a@x.com")).unwrap();
        assert_eq!(beer.id, 0);
        assert_eq!(beer.user, "a@x.com");
        assert_eq!(beer.name, "Pils");
        assert_eq!(beer.style, DEFAULT_STYLE);
        assert_eq!(beer.abv, 4.6);
        assert_eq!(beer.volume, 33.0);
        assert_eq!(beer.picture_url, DEFAULT_PICTURE_URL);
        assert_eq!(beer.how_many, 1);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = draft("", "strong", "").validate(Some("a@x.com")).unwrap_err();
        let fields: Vec<Field> = errors.fields().collect();
        assert_eq!(fields, vec![Field::Name, Field::Abv, Field::Volume]);
    }

    #[test]
    fn empty_name_alone_is_rejected() {
        let errors = draft("", "5", "50").validate(None).unwrap_err();
        assert!(errors.has(Field::Name));
        assert!(!errors.has(Field::Abv));
        assert!(!errors.has(Field::Volume));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let errors = draft("Pils", "NaN", "inf").validate(None).unwrap_err();
        assert!(errors.has(Field::Abv));
        assert!(errors.has(Field::Volume));
    }

    #[test]
    fn anonymous_add_uses_unknown_user() {
        let beer = draft("Pils", "5", "50").validate(None).unwrap();
        assert_eq!(beer.user, UNKNOWN_USER);
    }

    #[test]
    fn edit_keeps_identity_and_hidden_fields() {
        let original = Beer {
            id: 8,
            user: "a@x.com".to_string(),
            brewery: "Old".to_string(),
            name: "Old name".to_string(),
            style: "Porter".to_string(),
            abv: 6.0,
            volume: 50.0,
            picture_url: "https://example.com/p.jpg".to_string(),
            how_many: 4,
        };
        let mut form = BeerDraft::from_beer(&original);
        assert_eq!(form.abv, "6");
        form.name = "IPA2".to_string();
        form.volume = "lots".to_string();

        let edited = form.apply_to(&original);
        assert_eq!(edited.id, 8);
        assert_eq!(edited.user, "a@x.com");
        assert_eq!(edited.name, "IPA2");
        assert_eq!(edited.style, "Porter");
        assert_eq!(edited.abv, 6.0);
        assert_eq!(edited.volume, 0.0);
        assert_eq!(edited.picture_url, "https://example.com/p.jpg");
        assert_eq!(edited.how_many, 4);
    }
}
