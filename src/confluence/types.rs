//! Confluence REST v1 response shapes.
//!
//! Only the fields this tool reads are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

use crate::source::Document;

/// A paged list response.
#[derive(Debug, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub struct Version {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct ContentRef {
    pub id: String,
}

/// Page id plus version, from `expand=version`.
#[derive(Debug, Deserialize)]
pub struct ContentVersion {
    pub id: String,
    pub version: Option<Version>,
}

impl ContentVersion {
    pub fn number(&self) -> u64 {
        self.version.as_ref().map_or(0, |v| v.number)
    }
}

#[derive(Debug, Deserialize)]
pub struct Space {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub homepage: Option<ContentRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpaceRef {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Ancestor {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct BodyValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Body {
    pub view: Option<BodyValue>,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    pub labels: Option<Paged<Label>>,
}

/// Full page payload.
#[derive(Debug, Deserialize)]
pub struct Content {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub version: Option<Version>,
    #[serde(default)]
    pub space: SpaceRef,
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    #[serde(default)]
    pub body: Body,
    #[serde(default)]
    pub metadata: Metadata,
}

impl From<Content> for Document {
    fn from(content: Content) -> Self {
        Document {
            id: content.id,
            title: content.title,
            version: content.version.map_or(0, |v| v.number),
            space_key: content.space.key,
            space_name: content.space.name,
            ancestors: content.ancestors.into_iter().map(|a| a.title).collect(),
            labels: content
                .metadata
                .labels
                .map(|labels| labels.results.into_iter().map(|l| l.name).collect())
                .unwrap_or_default(),
            body_html: content.body.view.map(|v| v.value).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_converts_to_document() {
        let json = r#"{
            "id": "123",
            "type": "page",
            "title": "Install Guide",
            "version": {"number": 7, "when": "2025-01-01T00:00:00.000Z"},
            "space": {"key": "DOCS", "name": "Documentation"},
            "ancestors": [{"id": "1", "title": "Home"}, {"id": "2", "title": "Guides"}],
            "body": {"view": {"value": "<p>Hi</p>", "representation": "view"}},
            "metadata": {"labels": {"results": [{"prefix": "global", "name": "howto"}], "size": 1}}
        }"#;
        let content: Content = serde_json::from_str(json).unwrap();
        let doc = Document::from(content);

        assert_eq!(doc.id, "123");
        assert_eq!(doc.version, 7);
        assert_eq!(doc.space_name, "Documentation");
        assert_eq!(doc.ancestors, vec!["Home", "Guides"]);
        assert_eq!(doc.labels, vec!["howto"]);
        assert_eq!(doc.body_html, "<p>Hi</p>");
    }

    #[test]
    fn sparse_content_uses_defaults() {
        let content: Content = serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();
        let doc = Document::from(content);

        assert_eq!(doc.version, 0);
        assert!(doc.ancestors.is_empty());
        assert!(doc.body_html.is_empty());
    }

    #[test]
    fn content_version_without_version_is_zero() {
        let cv: ContentVersion = serde_json::from_str(r#"{"id": "9"}"#).unwrap();
        assert_eq!(cv.number(), 0);
    }
}
