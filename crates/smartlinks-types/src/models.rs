use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link as its owner sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A link as anyone visiting a public page sees it. Carries nothing that
/// identifies the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLink {
    pub title: String,
    pub url: String,
}

impl From<Link> for PublicLink {
    fn from(link: Link) -> Self {
        Self {
            title: link.title,
            url: link.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_link_drops_owner_fields() {
        let link = Link {
            id: 7,
            title: "Insta".into(),
            url: "https://instagram.com/a".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(PublicLink::from(link)).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["title"], "Insta");
        assert_eq!(obj["url"], "https://instagram.com/a");
    }
}
