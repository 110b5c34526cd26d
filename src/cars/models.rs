//! Car Models
//! Mission: Shape of the car catalog on the wire and in the store

use serde::{Deserialize, Deserializer, Serialize};

/// A catalog row. Columns other than `id` are nullable in the store and
/// come back as JSON null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub car_name: Option<String>,
    pub car_description: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub year: Option<i32>,
    pub stocks: Option<i64>,
    pub car_image: Option<String>,
}

/// A fully specified car, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub car_name: String,
    pub car_description: String,
    pub brand: String,
    pub price: f64,
    pub year: i32,
    pub stocks: i64,
    pub car_image: String,
}

/// Body of `POST /addcar`; every field is required
#[derive(Debug, Default, Deserialize)]
pub struct CreateCarRequest {
    pub car_name: Option<String>,
    pub car_description: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub year: Option<i32>,
    pub stocks: Option<i64>,
    pub car_image: Option<String>,
}

impl CreateCarRequest {
    /// Turn the request into a `NewCar`, or name every missing field.
    pub fn into_new_car(self) -> Result<NewCar, Vec<&'static str>> {
        let mut missing = Vec::new();
        if self.car_name.is_none() {
            missing.push("car_name");
        }
        if self.car_description.is_none() {
            missing.push("car_description");
        }
        if self.brand.is_none() {
            missing.push("brand");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.year.is_none() {
            missing.push("year");
        }
        if self.stocks.is_none() {
            missing.push("stocks");
        }
        if self.car_image.is_none() {
            missing.push("car_image");
        }

        match self {
            CreateCarRequest {
                car_name: Some(car_name),
                car_description: Some(car_description),
                brand: Some(brand),
                price: Some(price),
                year: Some(year),
                stocks: Some(stocks),
                car_image: Some(car_image),
            } => Ok(NewCar {
                car_name,
                car_description,
                brand,
                price,
                year,
                stocks,
                car_image,
            }),
            _ => Err(missing),
        }
    }

    /// Name to quote in responses, even when the request is incomplete
    pub fn display_name(&self) -> &str {
        self.car_name.as_deref().unwrap_or("")
    }
}

/// One field of a partial update.
///
/// `Absent` means the key was not sent, `Null` means it was sent as JSON
/// null. Use with `#[serde(default)]` so missing keys land on `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// The replacement value, if any. `Absent` and `Null` both keep the stored value.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            Patch::Absent | Patch::Null => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Body of `PUT /editcar/:id`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarPatch {
    pub car_name: Patch<String>,
    pub car_description: Patch<String>,
    pub brand: Patch<String>,
    pub price: Patch<f64>,
    pub year: Patch<i32>,
    pub stocks: Patch<i64>,
    pub car_image: Patch<String>,
}

impl CarPatch {
    /// True when the client sent none of the mutable fields
    pub fn is_empty(&self) -> bool {
        self.car_name.is_absent()
            && self.car_description.is_absent()
            && self.brand.is_absent()
            && self.price.is_absent()
            && self.year.is_absent()
            && self.stocks.is_absent()
            && self.car_image.is_absent()
    }
}
