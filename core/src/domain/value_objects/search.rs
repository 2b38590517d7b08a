//! Validated search filters and in-memory matching.

use serde::{Deserialize, Serialize};

use crate::domain::entities::post::{Currency, Features, Frequency, Post, PostDetails, PostType};
use crate::domain::value_objects::location::{Address, Province};

/// Inclusive numeric range with at least one bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RangeFilter {
    pub gte: Option<u32>,
    pub lte: Option<u32>,
}

impl RangeFilter {
    pub fn contains(&self, value: u32) -> bool {
        self.gte.map_or(true, |gte| value >= gte) && self.lte.map_or(true, |lte| value <= lte)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    pub province: Province,
    pub municipality: Option<String>,
}

impl LocationFilter {
    pub fn matches(&self, address: &Address) -> bool {
        self.province == address.province
            && self
                .municipality
                .as_ref()
                .map_or(true, |m| *m == address.municipality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeaturesFilter {
    pub bed: Option<RangeFilter>,
    pub bath: Option<RangeFilter>,
    pub backyard: Option<bool>,
    pub balcony: Option<bool>,
    pub garage: Option<bool>,
    pub pool: Option<bool>,
}

impl FeaturesFilter {
    pub fn matches(&self, features: &Features) -> bool {
        self.bed.map_or(true, |r| r.contains(features.bed as u32))
            && self.bath.map_or(true, |r| r.contains(features.bath as u32))
            && self.backyard.map_or(true, |v| v == features.backyard)
            && self.balcony.map_or(true, |v| v == features.balcony)
            && self.garage.map_or(true, |v| v == features.garage)
            && self.pool.map_or(true, |v| v == features.pool)
    }
}

/// Price bounds in a given currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFilter {
    pub currency: Currency,
    pub range: RangeFilter,
}

/// Subtype specific price filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceFilter {
    Sale(AmountFilter),
    Rent {
        amount: AmountFilter,
        frequency: Frequency,
    },
}

impl PriceFilter {
    pub fn matches(&self, details: &PostDetails) -> bool {
        match (self, details) {
            (PriceFilter::Sale(filter), PostDetails::Sale { amount, currency }) => {
                filter.currency == *currency && filter.range.contains(*amount)
            }
            (
                PriceFilter::Rent { amount: filter, frequency: wanted },
                PostDetails::Rent {
                    tax,
                    currency,
                    frequency,
                },
            ) => filter.currency == *currency && wanted == frequency && filter.range.contains(*tax),
            _ => false,
        }
    }
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub post_type: PostType,
    pub location: Option<LocationFilter>,
    pub features: Option<FeaturesFilter>,
    pub price: Option<PriceFilter>,
}

impl SearchFilter {
    /// Every post of the given type
    pub fn of_type(post_type: PostType) -> Self {
        Self {
            post_type,
            location: None,
            features: None,
            price: None,
        }
    }

    /// A post matches when its type and price match and any one of its
    /// properties satisfies both the location and the features filter.
    pub fn matches(&self, post: &Post) -> bool {
        if post.post_type() != self.post_type {
            return false;
        }
        if let Some(price) = &self.price {
            if !price.matches(&post.details) {
                return false;
            }
        }
        if self.location.is_none() && self.features.is_none() {
            return true;
        }
        post.properties.iter().any(|property| {
            self.location
                .as_ref()
                .map_or(true, |l| l.matches(&property.address))
                && self
                    .features
                    .as_ref()
                    .map_or(true, |f| f.matches(&property.features))
        })
    }
}
