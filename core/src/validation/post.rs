use serde::{Deserialize, Serialize};
use serde_json::Value;
use sigma_shared::utils::validation::ValidationErrors;
use validator::{Validate, ValidationError, ValidationErrors as FieldErrors};

use super::errors::{collect_result, field_error, from_serde, length_between, REQUIRED};
use super::fields::{normalize_phone, trimmed, trimmed_opt, validate_phone};
use super::ImageRequest;
use crate::domain::entities::{
    Contact, Currency, DetailsPatch, Features, Frequency, NewPost, Post, PostChanges, PostDetails,
    PostType, Property, MAX_IMAGES,
};
use crate::domain::value_objects::{Address, Province};

pub const INVALID_MUNICIPALITY: &str = "Must be a valid municipality";
pub const OFFERS_MISMATCH: &str = "Must match the number of properties";

/// Subtype fields of a new post, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DetailsRequest {
    Sale(SaleRequest),
    Rent(RentRequest),
    Exchange(ExchangeRequest),
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaleRequest {
    #[validate(required, range(min = 1, max = 999_999_999))]
    pub amount: Option<i64>,

    #[validate(required)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RentRequest {
    #[validate(required, range(min = 1, max = 999_999_999))]
    pub tax: Option<i64>,

    #[validate(required)]
    pub currency: Option<Currency>,

    #[validate(required)]
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExchangeRequest {
    #[validate(required, range(min = 0, max = 3))]
    pub needs: Option<i64>,

    #[validate(required, range(min = 1, max = 3))]
    pub offers: Option<i64>,
}

impl Validate for DetailsRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            DetailsRequest::Sale(request) => request.validate(),
            DetailsRequest::Rent(request) => request.validate(),
            DetailsRequest::Exchange(request) => request.validate(),
        }
    }
}

impl DetailsRequest {
    pub fn post_type(&self) -> PostType {
        match self {
            DetailsRequest::Sale(_) => PostType::Sale,
            DetailsRequest::Rent(_) => PostType::Rent,
            DetailsRequest::Exchange(_) => PostType::Exchange,
        }
    }

    fn offers(&self) -> Option<i64> {
        match self {
            DetailsRequest::Exchange(request) => request.offers,
            _ => None,
        }
    }

    /// `None` when a required field is absent
    fn into_details(self) -> Option<PostDetails> {
        let details = match self {
            DetailsRequest::Sale(r) => PostDetails::Sale {
                amount: r.amount? as u32,
                currency: r.currency?,
            },
            DetailsRequest::Rent(r) => PostDetails::Rent {
                tax: r.tax? as u32,
                currency: r.currency?,
                frequency: r.frequency?,
            },
            DetailsRequest::Exchange(r) => PostDetails::Exchange {
                needs: r.needs? as u8,
                offers: r.offers? as u8,
            },
        };
        Some(details)
    }
}

/// New listing: common fields, subtype fields, properties and images
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_new_post", skip_on_field_errors = false))]
pub struct NewPostRequest {
    #[serde(flatten)]
    pub details: DetailsRequest,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 1250))]
    pub description: Option<String>,

    #[validate(required)]
    pub whatsapp: Option<bool>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[serde(default)]
    #[validate(nested)]
    pub properties: Vec<PropertyRequest>,

    #[serde(default)]
    #[validate(length(min = 1, max = 10), nested)]
    pub images: Vec<ImageRequest>,
}

fn check_new_post(request: &NewPostRequest) -> Result<(), ValidationError> {
    check_property_count(request.details.post_type(), request.properties.len())?;
    match request.details.offers() {
        Some(offers) if offers as usize != request.properties.len() => {
            Err(field_error("offers", OFFERS_MISMATCH))
        }
        _ => Ok(()),
    }
}

fn check_property_count(post_type: PostType, count: usize) -> Result<(), ValidationError> {
    let (min, max) = post_type.property_bounds();
    if (min..=max).contains(&count) {
        return Ok(());
    }
    let message = if min == max {
        format!("Must have a length of {}", min)
    } else {
        length_between(min, max)
    };
    Err(field_error("properties", message))
}

pub fn parse_new_post(value: &Value) -> Result<NewPost, ValidationErrors> {
    let request = NewPostRequest::deserialize(value).map_err(from_serde)?;
    check_with_details(&request, &request.details)?;

    let details = request
        .details
        .into_details()
        .ok_or_else(|| ValidationErrors::single("type", REQUIRED))?;
    Ok(NewPost {
        description: request.description.filter(|d| !d.is_empty()),
        contact: Contact {
            phone: e164(request.phone),
            whatsapp: request.whatsapp.unwrap_or_default(),
        },
        details,
        properties: into_properties(request.properties)?,
        images: request
            .images
            .into_iter()
            .map(ImageRequest::into_image)
            .collect(),
    })
}

/// Partial subtype fields of an update, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DetailsPatchRequest {
    Sale(SalePatchRequest),
    Rent(RentPatchRequest),
    Exchange(ExchangePatchRequest),
}

#[derive(Debug, Deserialize, Validate)]
pub struct SalePatchRequest {
    #[validate(range(min = 1, max = 999_999_999))]
    pub amount: Option<i64>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RentPatchRequest {
    #[validate(range(min = 1, max = 999_999_999))]
    pub tax: Option<i64>,
    pub currency: Option<Currency>,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExchangePatchRequest {
    #[validate(range(min = 0, max = 3))]
    pub needs: Option<i64>,

    #[validate(range(min = 1, max = 3))]
    pub offers: Option<i64>,
}

impl Validate for DetailsPatchRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            DetailsPatchRequest::Sale(request) => request.validate(),
            DetailsPatchRequest::Rent(request) => request.validate(),
            DetailsPatchRequest::Exchange(request) => request.validate(),
        }
    }
}

impl DetailsPatchRequest {
    pub fn post_type(&self) -> PostType {
        match self {
            DetailsPatchRequest::Sale(_) => PostType::Sale,
            DetailsPatchRequest::Rent(_) => PostType::Rent,
            DetailsPatchRequest::Exchange(_) => PostType::Exchange,
        }
    }

    fn into_patch(self) -> DetailsPatch {
        match self {
            DetailsPatchRequest::Sale(r) => DetailsPatch::Sale {
                amount: r.amount.map(|a| a as u32),
                currency: r.currency,
            },
            DetailsPatchRequest::Rent(r) => DetailsPatch::Rent {
                tax: r.tax.map(|t| t as u32),
                currency: r.currency,
                frequency: r.frequency,
            },
            DetailsPatchRequest::Exchange(r) => DetailsPatch::Exchange {
                needs: r.needs.map(|n| n as u8),
                offers: r.offers.map(|o| o as u8),
            },
        }
    }
}

/// `{ new: [ImageRef], removed: [index] }`
#[derive(Debug, Deserialize, Validate)]
pub struct ImageChangesRequest {
    #[validate(required, length(max = 10), nested)]
    pub new: Option<Vec<ImageRequest>>,

    #[validate(required)]
    pub removed: Option<Vec<usize>>,
}

/// Partial update. `type` is required so the subtype fields can be read.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_post_changes", skip_on_field_errors = false))]
pub struct PostChangesRequest {
    #[serde(flatten)]
    pub details: DetailsPatchRequest,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(max = 1250))]
    pub description: Option<String>,

    pub whatsapp: Option<bool>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(nested)]
    pub properties: Option<Vec<PropertyRequest>>,

    #[validate(nested)]
    pub images: Option<ImageChangesRequest>,
}

fn check_post_changes(request: &PostChangesRequest) -> Result<(), ValidationError> {
    match &request.properties {
        Some(properties) => check_property_count(request.details.post_type(), properties.len()),
        None => Ok(()),
    }
}

pub fn parse_post_changes(value: &Value) -> Result<PostChanges, ValidationErrors> {
    let request = PostChangesRequest::deserialize(value).map_err(from_serde)?;
    check_with_details(&request, &request.details)?;

    let properties = match request.properties {
        Some(properties) => Some(into_properties(properties)?),
        None => None,
    };
    let (new_images, removed_images) = match request.images {
        Some(images) => (
            images
                .new
                .unwrap_or_default()
                .into_iter()
                .map(ImageRequest::into_image)
                .collect(),
            images.removed.unwrap_or_default(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(PostChanges {
        details: request.details.into_patch(),
        description: request.description,
        whatsapp: request.whatsapp,
        phone: request.phone.map(e164),
        properties,
        new_images,
        removed_images,
    })
}

/// `{ address: { province, municipality }, features: { ... } }`
#[derive(Debug, Deserialize, Validate)]
pub struct PropertyRequest {
    #[validate(required, nested)]
    pub address: Option<AddressRequest>,

    #[validate(required, nested)]
    pub features: Option<FeaturesRequest>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[validate(schema(function = "check_municipality"))]
pub struct AddressRequest {
    #[validate(required)]
    pub province: Option<Province>,

    #[serde(default, deserialize_with = "trimmed")]
    pub municipality: String,
}

fn check_municipality(address: &AddressRequest) -> Result<(), ValidationError> {
    match address.province {
        Some(province) if !province.has_municipality(&address.municipality) => {
            Err(field_error("municipality", INVALID_MUNICIPALITY))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct FeaturesRequest {
    #[validate(required, range(min = 0, max = 9))]
    pub bed: Option<i64>,

    #[validate(required, range(min = 0, max = 9))]
    pub bath: Option<i64>,

    #[validate(required)]
    pub backyard: Option<bool>,

    #[validate(required)]
    pub balcony: Option<bool>,

    #[validate(required)]
    pub garage: Option<bool>,

    #[validate(required)]
    pub pool: Option<bool>,
}

impl PropertyRequest {
    fn into_property(self) -> Option<Property> {
        let address = self.address?;
        let features = self.features?;
        Some(Property {
            address: Address {
                province: address.province?,
                municipality: address.municipality,
            },
            features: Features {
                bed: features.bed? as u8,
                bath: features.bath? as u8,
                backyard: features.backyard?,
                balcony: features.balcony?,
                garage: features.garage?,
                pool: features.pool?,
            },
        })
    }
}

fn into_properties(properties: Vec<PropertyRequest>) -> Result<Vec<Property>, ValidationErrors> {
    properties
        .into_iter()
        .map(PropertyRequest::into_property)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ValidationErrors::single("properties", REQUIRED))
}

/// Validate a request and its flattened subtype fields as one object
fn check_with_details<R, D>(request: &R, details: &D) -> Result<(), ValidationErrors>
where
    R: Validate,
    D: Validate,
{
    let mut errors = collect_result(request.validate());
    errors.merge("", collect_result(details.validate()));
    errors.sort_by_field();
    errors.into_result(())
}

/// Validated phones always normalize
fn e164(phone: String) -> String {
    normalize_phone(&phone).unwrap_or(phone)
}

/// Checks that only hold for a complete post: image count and, for
/// exchanges, one offer per property. Used after merging an update.
pub fn check_post(post: &Post) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if post.images.is_empty() {
        errors.add("images", "Must have a length of at least 1");
    }
    if post.images.len() > MAX_IMAGES {
        errors.add(
            "images",
            format!("Must have a length of at most {}", MAX_IMAGES),
        );
    }
    if let PostDetails::Exchange { offers, .. } = post.details {
        if offers as usize != post.properties.len() {
            errors.add("offers", OFFERS_MISMATCH);
        }
    }
    errors.into_result(())
}
