use serde::Serialize;
use uuid::Uuid;

use sigma_core::{Contact, Post, PostDetails, Property};

/// Public representation of a post
///
/// The subtype fields sit next to `type` at the top level:
/// `amount`/`currency` for sales, `tax`/`currency`/`frequency` for rents and
/// `needs`/`offers` for exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: PostDetails,
    pub description: String,
    pub contact: Contact,
    /// Image urls in display order
    pub images: Vec<String>,
    pub user_id: Uuid,
    pub properties: Vec<Property>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            details: post.details,
            description: post.description.unwrap_or_default(),
            contact: post.contact,
            images: post.images.into_iter().map(|image| image.url).collect(),
            user_id: post.user_id,
            properties: post.properties,
        }
    }
}

/// `{ "postId": ... }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdResponse {
    pub post_id: Uuid,
}

/// `{ "post": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct PostEnvelope {
    pub post: PostDto,
}

impl From<Post> for PostEnvelope {
    fn from(post: Post) -> Self {
        Self { post: post.into() }
    }
}

/// `{ "posts": [...] }`
#[derive(Debug, Clone, Serialize)]
pub struct PostsEnvelope {
    pub posts: Vec<PostDto>,
}

impl From<Vec<Post>> for PostsEnvelope {
    fn from(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(PostDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::{Address, Currency, Features, Frequency, ImageRef, NewPost, Province};

    fn rent_post() -> Post {
        Post::new(
            Uuid::new_v4(),
            NewPost {
                description: None,
                contact: Contact {
                    phone: "+16502530000".to_string(),
                    whatsapp: true,
                },
                details: PostDetails::Rent {
                    tax: 250,
                    currency: Currency::Usd,
                    frequency: Frequency::Monthly,
                },
                properties: vec![Property {
                    address: Address {
                        province: Province::LaHabana,
                        municipality: "Plaza de la Revolución".to_string(),
                    },
                    features: Features {
                        bed: 2,
                        bath: 1,
                        backyard: false,
                        balcony: true,
                        garage: false,
                        pool: false,
                    },
                }],
                images: vec![
                    ImageRef::new("/uploads/1.jpg", 1024),
                    ImageRef::new("/uploads/2.jpg", 2048),
                ],
            },
        )
    }

    #[test]
    fn test_rent_representation() {
        let post = rent_post();
        let user_id = post.user_id;
        let json = serde_json::to_value(PostDto::from(post)).unwrap();

        assert_eq!(json["type"], "rent");
        assert_eq!(json["tax"], 250);
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["frequency"], "monthly");
        assert_eq!(json["description"], "");
        assert_eq!(json["contact"]["whatsapp"], true);
        assert_eq!(json["images"], serde_json::json!(["/uploads/1.jpg", "/uploads/2.jpg"]));
        assert_eq!(json["userId"], user_id.to_string());
        assert_eq!(json["properties"][0]["address"]["province"], "La Habana");
        assert_eq!(json["properties"][0]["features"]["bed"], 2);
        assert!(json.get("amount").is_none());
    }

    #[test]
    fn test_post_id_response_is_camel_case() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(PostIdResponse { post_id: id }).unwrap();
        assert_eq!(json["postId"], id.to_string());
    }
}
