use serde::Deserialize;
use serde_json::Value;
use sigma_shared::utils::validation::ValidationErrors;
use validator::{Validate, ValidationError, ValidationErrors as FieldErrors};

use super::errors::field_error;
use super::fields::{coerced, trimmed_opt};
use super::post::INVALID_MUNICIPALITY;
use super::read;
use crate::domain::entities::{Currency, Frequency, PostType};
use crate::domain::value_objects::{
    AmountFilter, FeaturesFilter, LocationFilter, PriceFilter, Province, RangeFilter, SearchFilter,
};

pub const MISSING_BOUND: &str = "Must have gte or lte";
pub const INVERTED_RANGE: &str = "Must be a higher value";

/// Search filter, tagged by `type`. Numbers may be given as numeric
/// strings; price fields of other post types are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchRequest {
    Sale(SaleSearchRequest),
    Rent(RentSearchRequest),
    Exchange(ExchangeSearchRequest),
}

impl Validate for SearchRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        match self {
            SearchRequest::Sale(request) => request.validate(),
            SearchRequest::Rent(request) => request.validate(),
            SearchRequest::Exchange(request) => request.validate(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaleSearchRequest {
    #[validate(nested)]
    pub address: Option<LocationRequest>,

    #[validate(nested)]
    pub features: Option<FeaturesSearchRequest>,

    #[validate(nested)]
    pub amount: Option<AmountRangeRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RentSearchRequest {
    #[validate(nested)]
    pub address: Option<LocationRequest>,

    #[validate(nested)]
    pub features: Option<FeaturesSearchRequest>,

    #[validate(nested)]
    pub tax: Option<TaxRangeRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExchangeSearchRequest {
    #[validate(nested)]
    pub address: Option<LocationRequest>,

    #[validate(nested)]
    pub features: Option<FeaturesSearchRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_location"))]
pub struct LocationRequest {
    #[validate(required)]
    pub province: Option<Province>,

    #[serde(default, deserialize_with = "trimmed_opt")]
    pub municipality: Option<String>,
}

fn check_location(location: &LocationRequest) -> Result<(), ValidationError> {
    match (location.province, location.municipality.as_deref()) {
        (Some(province), Some(m)) if !m.is_empty() && !province.has_municipality(m) => {
            Err(field_error("municipality", INVALID_MUNICIPALITY))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeaturesSearchRequest {
    #[validate(nested)]
    pub bed: Option<CountRangeRequest>,

    #[validate(nested)]
    pub bath: Option<CountRangeRequest>,

    pub backyard: Option<bool>,
    pub balcony: Option<bool>,
    pub garage: Option<bool>,
    pub pool: Option<bool>,
}

/// Bedroom or bathroom count bounds
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_bounds"))]
pub struct CountRangeRequest {
    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 0, max = 9))]
    pub gte: Option<i64>,

    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 0, max = 9))]
    pub lte: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_bounds"))]
pub struct AmountRangeRequest {
    #[validate(required)]
    pub currency: Option<Currency>,

    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 1, max = 999_999_999))]
    pub gte: Option<i64>,

    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 1, max = 999_999_999))]
    pub lte: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_bounds"))]
pub struct TaxRangeRequest {
    #[validate(required)]
    pub currency: Option<Currency>,

    #[validate(required)]
    pub frequency: Option<Frequency>,

    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 1, max = 999_999_999))]
    pub gte: Option<i64>,

    #[serde(default, deserialize_with = "coerced")]
    #[validate(range(min = 1, max = 999_999_999))]
    pub lte: Option<i64>,
}

/// Requests carrying `gte` / `lte` bounds
trait Bounds {
    fn bounds(&self) -> (Option<i64>, Option<i64>);

    fn range(&self) -> RangeFilter {
        let (gte, lte) = self.bounds();
        RangeFilter {
            gte: gte.map(|v| v as u32),
            lte: lte.map(|v| v as u32),
        }
    }
}

impl Bounds for CountRangeRequest {
    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (self.gte, self.lte)
    }
}

impl Bounds for AmountRangeRequest {
    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (self.gte, self.lte)
    }
}

impl Bounds for TaxRangeRequest {
    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (self.gte, self.lte)
    }
}

impl<T: Bounds> Bounds for &T {
    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        (**self).bounds()
    }
}

/// At least one bound, and `lte >= gte` when both are given
fn check_bounds<B: Bounds>(request: &B) -> Result<(), ValidationError> {
    match request.bounds() {
        (None, None) => Err(field_error("", MISSING_BOUND)),
        (Some(gte), Some(lte)) if lte < gte => Err(field_error("lte", INVERTED_RANGE)),
        _ => Ok(()),
    }
}

impl LocationRequest {
    fn into_filter(self) -> Option<LocationFilter> {
        Some(LocationFilter {
            province: self.province?,
            municipality: self.municipality.filter(|m| !m.is_empty()),
        })
    }
}

impl FeaturesSearchRequest {
    fn into_filter(self) -> FeaturesFilter {
        FeaturesFilter {
            bed: self.bed.as_ref().map(Bounds::range),
            bath: self.bath.as_ref().map(Bounds::range),
            backyard: self.backyard,
            balcony: self.balcony,
            garage: self.garage,
            pool: self.pool,
        }
    }
}

/// Search filter from the decoded `data` query parameter
pub fn parse_search_filter(value: &Value) -> Result<SearchFilter, ValidationErrors> {
    let (post_type, address, features, price) = match read::<SearchRequest>(value)? {
        SearchRequest::Sale(r) => {
            let price = r.amount.and_then(|amount| {
                Some(PriceFilter::Sale(AmountFilter {
                    currency: amount.currency?,
                    range: amount.range(),
                }))
            });
            (PostType::Sale, r.address, r.features, price)
        }
        SearchRequest::Rent(r) => {
            let price = r.tax.and_then(|tax| {
                Some(PriceFilter::Rent {
                    amount: AmountFilter {
                        currency: tax.currency?,
                        range: tax.range(),
                    },
                    frequency: tax.frequency?,
                })
            });
            (PostType::Rent, r.address, r.features, price)
        }
        SearchRequest::Exchange(r) => (PostType::Exchange, r.address, r.features, None),
    };

    Ok(SearchFilter {
        post_type,
        location: address.and_then(LocationRequest::into_filter),
        features: features.map(FeaturesSearchRequest::into_filter),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_default_filter() {
        let filter = parse_search_filter(&json!({ "type": "sale" })).unwrap();
        assert_eq!(filter, SearchFilter::of_type(PostType::Sale));
    }

    #[test]
    fn test_full_rent_filter_with_string_numbers() {
        let filter = parse_search_filter(&json!({
            "type": "rent",
            "address": { "province": "Matanzas", "municipality": "Cárdenas" },
            "features": { "bed": { "gte": "2" }, "pool": true },
            "tax": { "currency": "USD", "frequency": "daily", "gte": "20", "lte": 80 }
        }))
        .unwrap();

        let location = filter.location.unwrap();
        assert_eq!(location.province, Province::Matanzas);
        assert_eq!(location.municipality.as_deref(), Some("Cárdenas"));

        let features = filter.features.unwrap();
        assert_eq!(features.bed, Some(RangeFilter { gte: Some(2), lte: None }));
        assert_eq!(features.pool, Some(true));
        assert_eq!(features.garage, None);

        assert_eq!(
            filter.price,
            Some(PriceFilter::Rent {
                amount: AmountFilter {
                    currency: Currency::Usd,
                    range: RangeFilter { gte: Some(20), lte: Some(80) },
                },
                frequency: Frequency::Daily,
            })
        );
    }

    #[test]
    fn test_zero_is_a_bound() {
        let filter = parse_search_filter(&json!({
            "type": "exchange",
            "features": { "bath": { "gte": 0 } }
        }))
        .unwrap();
        assert_eq!(
            filter.features.unwrap().bath,
            Some(RangeFilter { gte: Some(0), lte: None })
        );
    }

    #[test]
    fn test_range_rules() {
        let errors = parse_search_filter(&json!({
            "type": "sale",
            "amount": { "currency": "CUP" },
            "features": { "bed": { "gte": 4, "lte": 2 } }
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["amount", "features.bed.lte"]);
        assert_eq!(errors.errors()[0].message, MISSING_BOUND);
        assert_eq!(errors.errors()[1].message, INVERTED_RANGE);
    }

    #[test]
    fn test_bounds_are_range_checked() {
        let errors = parse_search_filter(&json!({
            "type": "rent",
            "features": { "bath": { "lte": "12" } },
            "tax": { "currency": "USD", "gte": 0 }
        }))
        .unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["features.bath.lte", "tax.frequency", "tax.gte"]
        );
    }

    #[test]
    fn test_invalid_municipality() {
        let errors = parse_search_filter(&json!({
            "type": "sale",
            "address": { "province": "Granma", "municipality": "Playa" }
        }))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["address.municipality"]);
    }

    #[test]
    fn test_exchange_ignores_price() {
        let filter = parse_search_filter(&json!({
            "type": "exchange",
            "amount": { "currency": "USD", "gte": 1 }
        }))
        .unwrap();
        assert_eq!(filter.price, None);
    }
}
