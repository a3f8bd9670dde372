use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ProductError, ProductResult};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const PRICE_NON_NEGATIVE: &str = "Product price must be non-negative";
pub const STOCK_NON_NEGATIVE: &str = "Product stock must be non-negative";

/// Store-assigned product identifier.
///
/// Rendered as a decimal string (`"id": "1"`) in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(i64);

impl ProductId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a product id")]
pub struct InvalidProductId(String);

impl FromStr for ProductId {
    type Err = InvalidProductId;

    /// Only positive decimal integers can have been issued.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(v) if v > 0 && !s.starts_with('+') => Ok(Self(v)),
            _ => Err(InvalidProductId(s.to_string())),
        }
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(value_type = String, example = "1")]
    pub id: ProductId,
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = 9.99)]
    pub price: f64,
    #[schema(example = 100)]
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated product that has not been stored yet.
///
/// Timestamps are set by the caller before insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            stock: self.stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn default_name() -> Option<String> {
    Some(String::new())
}

fn default_price() -> Option<f64> {
    Some(0.0)
}

fn default_stock() -> Option<i32> {
    Some(0)
}

/// Stock arrives as a JSON number; `100.0` is accepted as `100`, `1.5` is not.
fn whole_stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "invalid value: {value}, expected an integer for stock"
        )));
    }
    Ok(Some(value as i32))
}

fn some_whole_stock<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<i32>>, D::Error> {
    whole_stock(deserializer).map(Some)
}

fn not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(NAME_REQUIRED)));
    }
    Ok(())
}

/// POST payload.
///
/// Absent fields fall back to `""`, `0.0` and `0`; an explicit `null` stays
/// `None` so validation rejects it.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[serde(default = "default_name")]
    #[validate(
        required(message = "Product name is required"),
        custom(function = "not_blank")
    )]
    #[schema(value_type = String, example = "Widget")]
    pub name: Option<String>,
    #[serde(default = "default_price")]
    #[validate(
        required(message = "Product price must be non-negative"),
        range(min = 0.0, message = "Product price must be non-negative")
    )]
    #[schema(value_type = f64, example = 9.99, minimum = 0)]
    pub price: Option<f64>,
    #[serde(default = "default_stock", deserialize_with = "whole_stock")]
    #[validate(
        required(message = "Product stock must be non-negative"),
        range(min = 0, message = "Product stock must be non-negative")
    )]
    #[schema(value_type = i32, example = 100, minimum = 0)]
    pub stock: Option<i32>,
}

impl Default for CreateProduct {
    fn default() -> Self {
        Self {
            name: default_name(),
            price: default_price(),
            stock: default_stock(),
        }
    }
}

impl CreateProduct {
    /// Validate the payload and stamp both timestamps with `now`.
    pub fn into_new_product(self, now: DateTime<Utc>) -> ProductResult<NewProduct> {
        self.validate().map_err(|e| first_failure(&e))?;

        Ok(NewProduct {
            name: self.name.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            stock: self.stock.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// PUT payload: any subset of the fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "Gadget")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<f64>, example = 12.5, minimum = 0)]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "some_whole_stock")]
    #[schema(value_type = Option<i32>, example = 50, minimum = 0)]
    pub stock: Option<Option<i32>>,
}

impl UpdateProduct {
    /// Validate the supplied fields. Unsupplied fields belong to an already
    /// valid record, so only the supplied ones are checked.
    pub fn into_changes(self) -> ProductResult<ProductChanges> {
        let nulls = [
            ("name", self.name == Some(None), NAME_REQUIRED),
            ("price", self.price == Some(None), PRICE_NON_NEGATIVE),
            ("stock", self.stock == Some(None), STOCK_NON_NEGATIVE),
        ];
        let changes = ProductChanges {
            name: self.name.flatten(),
            price: self.price.flatten(),
            stock: self.stock.flatten(),
        };

        let mut errors = changes.validate().err().unwrap_or_else(ValidationErrors::new);
        for (field, is_null, message) in nulls {
            if is_null {
                let error = ValidationError::new("required").with_message(Cow::Borrowed(message));
                errors.add(field, error);
            }
        }

        if errors.errors().is_empty() {
            Ok(changes)
        } else {
            Err(first_failure(&errors))
        }
    }
}

/// Validated partial update handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProductChanges {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Product price must be non-negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Product stock must be non-negative"))]
    pub stock: Option<i32>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }

    /// Names of the fields being changed, for logs.
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            self.name.is_some().then_some("name"),
            self.price.is_some().then_some("price"),
            self.stock.is_some().then_some("stock"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Name, then price, then stock; the first failing field's message wins.
fn first_failure(errors: &ValidationErrors) -> ProductError {
    let fields = errors.field_errors();
    let message = ["name", "price", "stock"]
        .into_iter()
        .filter_map(|field| fields.get(field))
        .find_map(|errs| errs.first())
        .and_then(|err| err.message.clone())
        .map(Cow::into_owned)
        .unwrap_or_else(|| errors.to_string());
    ProductError::Validation(message)
}

/// Current time at the precision PostgreSQL stores (microseconds), so a
/// record returned from a write equals the one read back later.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `updated_at` for a modification at `now`: strictly after `previous`,
/// even when the clock has not advanced.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + TimeDelta::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(value: serde_json::Value) -> CreateProduct {
        serde_json::from_value(value).unwrap()
    }

    fn update(value: serde_json::Value) -> UpdateProduct {
        serde_json::from_value(value).unwrap()
    }

    fn validation_message(err: ProductError) -> String {
        match err {
            ProductError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_product_id_parses_positive_integers_only() {
        assert_eq!("1".parse::<ProductId>().unwrap(), ProductId::new(1));
        assert_eq!("9007199254740993".parse::<ProductId>().unwrap().value(), 9007199254740993);
        for bad in ["0", "-1", "+1", "abc", "", "1.0", " 1", "99999999999999999999"] {
            assert!(bad.parse::<ProductId>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_product_serializes_to_external_representation() {
        let ts = DateTime::parse_from_rfc3339("2025-01-02T03:04:05.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let product = Product {
            id: ProductId::new(1),
            name: "Widget".into(),
            price: 9.99,
            stock: 100,
            created_at: ts,
            updated_at: ts,
        };

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1",
                "name": "Widget",
                "price": 9.99,
                "stock": 100,
                "createdAt": "2025-01-02T03:04:05.123456Z",
                "updatedAt": "2025-01-02T03:04:05.123456Z"
            })
        );

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_create_absent_fields_take_defaults() {
        let payload = create(json!({"name": "Widget"}));
        assert_eq!(payload.price, Some(0.0));
        assert_eq!(payload.stock, Some(0));

        let new = payload.into_new_product(now()).unwrap();
        assert_eq!(new.price, 0.0);
        assert_eq!(new.stock, 0);
        assert_eq!(new.created_at, new.updated_at);
    }

    #[test]
    fn test_create_validation_messages_in_order() {
        let cases = [
            (json!({"name": "", "price": -1, "stock": -1}), NAME_REQUIRED),
            (json!({"name": "   ", "price": 1, "stock": 1}), NAME_REQUIRED),
            (json!({"price": 1, "stock": 1}), NAME_REQUIRED),
            (json!({"name": null}), NAME_REQUIRED),
            (json!({"name": "A", "price": -0.01, "stock": -1}), PRICE_NON_NEGATIVE),
            (json!({"name": "A", "price": null}), PRICE_NON_NEGATIVE),
            (json!({"name": "A", "price": 1, "stock": -1}), STOCK_NON_NEGATIVE),
            (json!({"name": "A", "stock": null}), STOCK_NON_NEGATIVE),
        ];

        for (payload, expected) in cases {
            let err = create(payload.clone()).into_new_product(now()).unwrap_err();
            assert_eq!(validation_message(err), expected, "payload: {payload}");
        }
    }

    #[test]
    fn test_create_accepts_zero_price_and_stock() {
        let new = create(json!({"name": "Free", "price": 0, "stock": 0}))
            .into_new_product(now())
            .unwrap();
        assert_eq!(new.name, "Free");
        assert_eq!(new.price, 0.0);
    }

    #[test]
    fn test_create_rejects_wrong_types() {
        assert!(serde_json::from_value::<CreateProduct>(json!({"name": 5})).is_err());
        for stock in [json!(1.5), json!(1e10), json!("5")] {
            let payload = json!({"name": "A", "stock": stock});
            assert!(serde_json::from_value::<CreateProduct>(payload).is_err(), "stock {stock}");
        }
    }

    #[test]
    fn test_stock_accepts_integral_floats() {
        let payload = create(json!({"name": "A", "stock": 100.0}));
        assert_eq!(payload.stock, Some(100));

        let payload = update(json!({"stock": 5.0}));
        assert_eq!(payload.stock, Some(Some(5)));
        assert!(serde_json::from_value::<UpdateProduct>(json!({"stock": 2.5})).is_err());

        let err = create(json!({"name": "A", "stock": -3.0})).into_new_product(now()).unwrap_err();
        assert_eq!(validation_message(err), STOCK_NON_NEGATIVE);
    }

    #[test]
    fn test_validation_messages_come_from_constants() {
        let cases = [
            (create(json!({"name": null})), NAME_REQUIRED),
            (create(json!({"name": "A", "price": null})), PRICE_NON_NEGATIVE),
            (create(json!({"name": "A", "stock": null})), STOCK_NON_NEGATIVE),
            (create(json!({"name": "A", "price": -1})), PRICE_NON_NEGATIVE),
            (create(json!({"name": "A", "stock": -1})), STOCK_NON_NEGATIVE),
        ];
        for (payload, expected) in cases {
            let errors = payload.validate().unwrap_err();
            assert_eq!(first_failure(&errors).to_string(), expected);
        }

        let changes = ProductChanges {
            name: Some(" ".into()),
            price: Some(-1.0),
            stock: Some(-1),
        };
        let fields = changes.validate().unwrap_err();
        assert_eq!(fields.field_errors().len(), 3);
        assert_eq!(validation_message(first_failure(&fields)), NAME_REQUIRED);
    }

    #[test]
    fn test_update_null_interleaves_with_field_order() {
        let err = update(json!({"stock": null, "price": -1})).into_changes().unwrap_err();
        assert_eq!(validation_message(err), PRICE_NON_NEGATIVE);

        let err = update(json!({"price": null, "name": "  "})).into_changes().unwrap_err();
        assert_eq!(validation_message(err), NAME_REQUIRED);

        let err = update(json!({"name": "A", "stock": null})).into_changes().unwrap_err();
        assert_eq!(validation_message(err), STOCK_NON_NEGATIVE);
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let payload = update(json!({"stock": 50}));
        assert_eq!(payload.name, None);
        assert_eq!(payload.stock, Some(Some(50)));

        let payload = update(json!({"name": null}));
        assert_eq!(payload.name, Some(None));
        assert_eq!(validation_message(payload.into_changes().unwrap_err()), NAME_REQUIRED);
    }

    #[test]
    fn test_update_validates_only_supplied_fields() {
        let changes = update(json!({"stock": 50})).into_changes().unwrap();
        assert_eq!(
            changes,
            ProductChanges {
                stock: Some(50),
                ..Default::default()
            }
        );
        assert_eq!(changes.field_names(), vec!["stock"]);

        let err = update(json!({"stock": -1, "price": -1})).into_changes().unwrap_err();
        assert_eq!(validation_message(err), PRICE_NON_NEGATIVE);
    }

    #[test]
    fn test_empty_update_is_empty() {
        let changes = update(json!({})).into_changes().unwrap();
        assert!(changes.is_empty());
        assert!(changes.field_names().is_empty());
    }

    #[test]
    fn test_now_is_microsecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_next_updated_at_strictly_increases() {
        let t = now();
        assert_eq!(next_updated_at(t, t), t + TimeDelta::microseconds(1));
        assert_eq!(
            next_updated_at(t, t - TimeDelta::seconds(5)),
            t + TimeDelta::microseconds(1)
        );
        let later = t + TimeDelta::seconds(1);
        assert_eq!(next_updated_at(t, later), later);
    }
}
