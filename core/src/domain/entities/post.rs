//! Post entity: a sale, rent or exchange listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Address, ImageRef};

/// Highest accepted amount or tax
pub const MAX_PRICE: u32 = 999_999_999;

/// Maximum description length, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1250;

/// Maximum number of images on a post
pub const MAX_IMAGES: usize = 10;

/// Post subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Sale,
    Rent,
    Exchange,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Sale => "sale",
            PostType::Rent => "rent",
            PostType::Exchange => "exchange",
        }
    }

    /// Accepted property count for this post type
    pub fn property_bounds(&self) -> (usize, usize) {
        match self {
            PostType::Sale | PostType::Rent => (1, 1),
            PostType::Exchange => (1, 3),
        }
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(PostType::Sale),
            "rent" => Ok(PostType::Rent),
            "exchange" => Ok(PostType::Exchange),
            _ => Err(format!("Invalid post type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cup,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cup => "CUP",
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "CUP" => Ok(Currency::Cup),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

/// Rent billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("Invalid frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub bed: u8,
    pub bath: u8,
    pub backyard: bool,
    pub balcony: bool,
    pub garage: bool,
    pub pool: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub address: Address,
    pub features: Features,
}

/// How to reach the author about a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// E.164 formatted phone number
    pub phone: String,
    pub whatsapp: bool,
}

/// Subtype specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostDetails {
    Sale { amount: u32, currency: Currency },
    Rent { tax: u32, currency: Currency, frequency: Frequency },
    Exchange { needs: u8, offers: u8 },
}

impl PostDetails {
    pub fn post_type(&self) -> PostType {
        match self {
            PostDetails::Sale { .. } => PostType::Sale,
            PostDetails::Rent { .. } => PostType::Rent,
            PostDetails::Exchange { .. } => PostType::Exchange,
        }
    }
}

/// Partial subtype fields of an update; the variant must match the post type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsPatch {
    Sale {
        amount: Option<u32>,
        currency: Option<Currency>,
    },
    Rent {
        tax: Option<u32>,
        currency: Option<Currency>,
        frequency: Option<Frequency>,
    },
    Exchange {
        needs: Option<u8>,
        offers: Option<u8>,
    },
}

impl DetailsPatch {
    pub fn post_type(&self) -> PostType {
        match self {
            DetailsPatch::Sale { .. } => PostType::Sale,
            DetailsPatch::Rent { .. } => PostType::Rent,
            DetailsPatch::Exchange { .. } => PostType::Exchange,
        }
    }

    /// Merges the patch into `details`. Returns `false` on a type mismatch.
    pub fn apply_to(self, details: &mut PostDetails) -> bool {
        match (self, details) {
            (
                DetailsPatch::Sale { amount: a, currency: c },
                PostDetails::Sale { amount, currency },
            ) => {
                if let Some(a) = a {
                    *amount = a;
                }
                if let Some(c) = c {
                    *currency = c;
                }
                true
            }
            (
                DetailsPatch::Rent {
                    tax: t,
                    currency: c,
                    frequency: f,
                },
                PostDetails::Rent {
                    tax,
                    currency,
                    frequency,
                },
            ) => {
                if let Some(t) = t {
                    *tax = t;
                }
                if let Some(c) = c {
                    *currency = c;
                }
                if let Some(f) = f {
                    *frequency = f;
                }
                true
            }
            (
                DetailsPatch::Exchange { needs: n, offers: o },
                PostDetails::Exchange { needs, offers },
            ) => {
                if let Some(n) = n {
                    *needs = n;
                }
                if let Some(o) = o {
                    *offers = o;
                }
                true
            }
            _ => false,
        }
    }
}

/// Validated data for a new post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub description: Option<String>,
    pub contact: Contact,
    pub details: PostDetails,
    pub properties: Vec<Property>,
    pub images: Vec<ImageRef>,
}

/// Validated partial update of a post. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub details: DetailsPatch,
    pub description: Option<String>,
    pub whatsapp: Option<bool>,
    pub phone: Option<String>,
    pub properties: Option<Vec<Property>>,
    /// Images appended after the removals
    pub new_images: Vec<ImageRef>,
    /// Indices into the current image list
    pub removed_images: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: Option<String>,
    pub contact: Contact,
    pub details: PostDetails,
    pub properties: Vec<Property>,
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user_id: Uuid, data: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            description: data.description,
            contact: data.contact,
            details: data.details,
            properties: data.properties,
            images: data.images,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn post_type(&self) -> PostType {
        self.details.post_type()
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Applies `changes` and returns the images that were removed, or `None`
    /// (leaving the post untouched) when the patch targets another post type.
    ///
    /// Removal indices refer to the image list before the update; out of
    /// range indices are ignored. Callers validate the resulting post.
    pub fn apply_changes(&mut self, changes: PostChanges) -> Option<Vec<ImageRef>> {
        if changes.details.post_type() != self.post_type() {
            return None;
        }
        changes.details.apply_to(&mut self.details);

        if let Some(description) = changes.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(whatsapp) = changes.whatsapp {
            self.contact.whatsapp = whatsapp;
        }
        if let Some(phone) = changes.phone {
            self.contact.phone = phone;
        }
        if let Some(properties) = changes.properties {
            self.properties = properties;
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.images.len() + changes.new_images.len());
        for (index, image) in std::mem::take(&mut self.images).into_iter().enumerate() {
            if changes.removed_images.contains(&index) {
                removed.push(image);
            } else {
                kept.push(image);
            }
        }
        kept.extend(changes.new_images);
        self.images = kept;

        self.updated_at = Utc::now();
        Some(removed)
    }
}
