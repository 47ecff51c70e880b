//! Outbound (passive reply) messages.
//!
//! A synchronous rule answers an inbound message by returning an
//! [`OutMessage`]. Each body kind has its own builder:
//!
//! ```rust,ignore
//! let reply = OutMessage::text()
//!     .content("welcome!")
//!     .to_user(message.from_user.clone().unwrap_or_default())
//!     .from_user("gh_account")
//!     .build();
//! ```
//!
//! Turning a reply into the platform's XML envelope is left to the transport
//! layer; this module only models the data.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A reply produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutMessage {
    #[serde(rename = "ToUserName")]
    pub to_user: String,

    #[serde(rename = "FromUserName")]
    pub from_user: String,

    #[serde(rename = "CreateTime")]
    pub create_time: i64,

    #[serde(flatten)]
    pub body: OutBody,
}

/// The kind-specific part of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "MsgType", rename_all = "snake_case")]
pub enum OutBody {
    Text {
        #[serde(rename = "Content")]
        content: String,
    },
    Image {
        #[serde(rename = "MediaId")]
        media_id: String,
    },
    Voice {
        #[serde(rename = "MediaId")]
        media_id: String,
    },
    Video {
        #[serde(rename = "MediaId")]
        media_id: String,
        #[serde(rename = "Title", default)]
        title: Option<String>,
        #[serde(rename = "Description", default)]
        description: Option<String>,
    },
    Music {
        #[serde(rename = "Title", default)]
        title: Option<String>,
        #[serde(rename = "Description", default)]
        description: Option<String>,
        #[serde(rename = "MusicUrl", default)]
        music_url: Option<String>,
        #[serde(rename = "HQMusicUrl", default)]
        hq_music_url: Option<String>,
        #[serde(rename = "ThumbMediaId")]
        thumb_media_id: String,
    },
    News {
        #[serde(rename = "Articles")]
        articles: Vec<Article>,
    },
    TransferCustomerService {
        #[serde(rename = "KfAccount", default)]
        kf_account: Option<String>,
    },
}

impl OutBody {
    /// The platform's `MsgType` for this body.
    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Voice { .. } => "voice",
            Self::Video { .. } => "video",
            Self::Music { .. } => "music",
            Self::News { .. } => "news",
            Self::TransferCustomerService { .. } => "transfer_customer_service",
        }
    }
}

/// One entry of a news reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "PicUrl", default)]
    pub pic_url: Option<String>,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
}

impl OutMessage {
    /// The platform's `MsgType` for this reply.
    pub fn msg_type(&self) -> &'static str {
        self.body.msg_type()
    }

    pub fn text() -> ReplyBuilder<TextBody> {
        ReplyBuilder::new(TextBody::default())
    }

    pub fn image() -> ReplyBuilder<ImageBody> {
        ReplyBuilder::new(ImageBody::default())
    }

    pub fn voice() -> ReplyBuilder<VoiceBody> {
        ReplyBuilder::new(VoiceBody::default())
    }

    pub fn video() -> ReplyBuilder<VideoBody> {
        ReplyBuilder::new(VideoBody::default())
    }

    pub fn music() -> ReplyBuilder<MusicBody> {
        ReplyBuilder::new(MusicBody::default())
    }

    pub fn news() -> ReplyBuilder<NewsBody> {
        ReplyBuilder::new(NewsBody::default())
    }

    pub fn transfer_customer_service() -> ReplyBuilder<TransferBody> {
        ReplyBuilder::new(TransferBody::default())
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Converts a builder's accumulated state into an [`OutBody`].
pub trait IntoBody {
    fn into_body(self) -> OutBody;
}

/// Typed builder for one reply kind.
///
/// The envelope setters live on every builder; the kind-specific setters are
/// only available on the matching `ReplyBuilder<Kind>`.
#[derive(Debug, Clone, Default)]
pub struct ReplyBuilder<B> {
    to_user: String,
    from_user: String,
    body: B,
}

impl<B: IntoBody> ReplyBuilder<B> {
    fn new(body: B) -> Self {
        Self {
            to_user: String::new(),
            from_user: String::new(),
            body,
        }
    }

    pub fn to_user(mut self, to_user: impl Into<String>) -> Self {
        self.to_user = to_user.into();
        self
    }

    pub fn from_user(mut self, from_user: impl Into<String>) -> Self {
        self.from_user = from_user.into();
        self
    }

    /// Stamps the current time and produces the reply.
    pub fn build(self) -> OutMessage {
        let create_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        OutMessage {
            to_user: self.to_user,
            from_user: self.from_user,
            create_time,
            body: self.body.into_body(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextBody {
    content: String,
}

impl IntoBody for TextBody {
    fn into_body(self) -> OutBody {
        OutBody::Text {
            content: self.content,
        }
    }
}

impl ReplyBuilder<TextBody> {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.body.content = content.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageBody {
    media_id: String,
}

impl IntoBody for ImageBody {
    fn into_body(self) -> OutBody {
        OutBody::Image {
            media_id: self.media_id,
        }
    }
}

impl ReplyBuilder<ImageBody> {
    pub fn media_id(mut self, media_id: impl Into<String>) -> Self {
        self.body.media_id = media_id.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct VoiceBody {
    media_id: String,
}

impl IntoBody for VoiceBody {
    fn into_body(self) -> OutBody {
        OutBody::Voice {
            media_id: self.media_id,
        }
    }
}

impl ReplyBuilder<VoiceBody> {
    pub fn media_id(mut self, media_id: impl Into<String>) -> Self {
        self.body.media_id = media_id.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct VideoBody {
    media_id: String,
    title: Option<String>,
    description: Option<String>,
}

impl IntoBody for VideoBody {
    fn into_body(self) -> OutBody {
        OutBody::Video {
            media_id: self.media_id,
            title: self.title,
            description: self.description,
        }
    }
}

impl ReplyBuilder<VideoBody> {
    pub fn media_id(mut self, media_id: impl Into<String>) -> Self {
        self.body.media_id = media_id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.body.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.body.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MusicBody {
    title: Option<String>,
    description: Option<String>,
    music_url: Option<String>,
    hq_music_url: Option<String>,
    thumb_media_id: String,
}

impl IntoBody for MusicBody {
    fn into_body(self) -> OutBody {
        OutBody::Music {
            title: self.title,
            description: self.description,
            music_url: self.music_url,
            hq_music_url: self.hq_music_url,
            thumb_media_id: self.thumb_media_id,
        }
    }
}

impl ReplyBuilder<MusicBody> {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.body.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.body.description = Some(description.into());
        self
    }

    pub fn music_url(mut self, url: impl Into<String>) -> Self {
        self.body.music_url = Some(url.into());
        self
    }

    pub fn hq_music_url(mut self, url: impl Into<String>) -> Self {
        self.body.hq_music_url = Some(url.into());
        self
    }

    pub fn thumb_media_id(mut self, media_id: impl Into<String>) -> Self {
        self.body.thumb_media_id = media_id.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsBody {
    articles: Vec<Article>,
}

impl IntoBody for NewsBody {
    fn into_body(self) -> OutBody {
        OutBody::News {
            articles: self.articles,
        }
    }
}

impl ReplyBuilder<NewsBody> {
    /// Appends an article; the platform renders them in insertion order.
    pub fn article(mut self, article: Article) -> Self {
        self.body.articles.push(article);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransferBody {
    kf_account: Option<String>,
}

impl IntoBody for TransferBody {
    fn into_body(self) -> OutBody {
        OutBody::TransferCustomerService {
            kf_account: self.kf_account,
        }
    }
}

impl ReplyBuilder<TransferBody> {
    /// Routes the conversation to a specific customer-service account.
    pub fn kf_account(mut self, account: impl Into<String>) -> Self {
        self.body.kf_account = Some(account.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_builder_fills_envelope() {
        let reply = OutMessage::text()
            .content("hello")
            .to_user("o_user")
            .from_user("gh_123")
            .build();

        assert_eq!(reply.msg_type(), "text");
        assert_eq!(reply.to_user, "o_user");
        assert_eq!(reply.from_user, "gh_123");
        assert!(reply.create_time > 0);
        assert_eq!(
            reply.body,
            OutBody::Text {
                content: "hello".into()
            }
        );
    }

    #[test]
    fn news_keeps_article_order() {
        let reply = OutMessage::news()
            .article(Article {
                title: Some("first".into()),
                ..Default::default()
            })
            .article(Article {
                title: Some("second".into()),
                ..Default::default()
            })
            .build();

        let OutBody::News { articles } = reply.body else {
            panic!("expected news body");
        };
        let titles: Vec<_> = articles.iter().filter_map(|a| a.title.as_deref()).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn serializes_msg_type_tag() {
        let reply = OutMessage::transfer_customer_service()
            .kf_account("kf2001@gh_123")
            .build();
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["MsgType"], "transfer_customer_service");
        assert_eq!(json["KfAccount"], "kf2001@gh_123");
    }
}
