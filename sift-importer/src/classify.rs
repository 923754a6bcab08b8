//! Article-type classification from the parsed document.
//!
//! The infobox type is the strongest signal; birth/death-date templates
//! fall back to `person`. Everything else is `other`.

use sift::ArticleType;
use sift_wikitext::Document;

pub fn classify(doc: &Document) -> ArticleType {
    for infobox in doc.infoboxes() {
        if let Some(article_type) = infobox_type(&infobox.r#type) {
            return article_type;
        }
    }

    let person_template = doc
        .templates()
        .iter()
        .any(|t| t.name == "birth date" || t.name == "death date");
    if person_template {
        return ArticleType::Person;
    }

    ArticleType::Other
}

fn infobox_type(keyword: &str) -> Option<ArticleType> {
    let article_type = match keyword {
        "person" | "officeholder" | "scientist" | "writer" | "athlete" | "musician"
        | "footballer" | "biography" | "royalty" | "artist" | "politician" => ArticleType::Person,
        "settlement" | "country" | "city" | "town" | "village" | "river" | "mountain"
        | "island" | "commune" | "lake" | "park" | "building" | "station" => ArticleType::Place,
        "company" | "university" | "organization" | "organisation" | "school" | "airline"
        | "museum" | "newspaper" | "band" => ArticleType::Org,
        "album" | "film" | "book" | "song" | "single" | "television" | "video" | "painting" => {
            ArticleType::Work
        }
        "election" | "battle" | "war" | "olympic" | "earthquake" | "hurricane" | "tournament"
        | "festival" => ArticleType::Event,
        _ => return None,
    };
    Some(article_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_wikitext::{parse, ParseOptions};

    fn classify_text(text: &str) -> ArticleType {
        classify(&parse(text, &ParseOptions::default()))
    }

    #[test]
    fn test_infobox_person() {
        assert_eq!(
            classify_text("{{Infobox person|name=Ada}}\nAda was a mathematician."),
            ArticleType::Person
        );
    }

    #[test]
    fn test_infobox_settlement() {
        assert_eq!(
            classify_text("{{Infobox settlement|name=Oslo}}\nOslo is a city."),
            ArticleType::Place
        );
    }

    #[test]
    fn test_birth_date_fallback() {
        assert_eq!(
            classify_text("Born {{birth date|1990|5|15}} in a small town."),
            ArticleType::Person
        );
    }

    #[test]
    fn test_default_other() {
        assert_eq!(classify_text("Plain article text."), ArticleType::Other);
    }
}
