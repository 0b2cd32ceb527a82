//! Conversions between [`citylist`] values and the generated wire messages.
//!
//! The core crate knows nothing about protobuf; the transports convert at the
//! edge, one message per city for streaming and one list for unary calls.

use crate::proto;
use citylist::City;

impl From<City> for proto::City {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
        }
    }
}

impl From<proto::City> for City {
    fn from(city: proto::City) -> Self {
        Self {
            id: city.id,
            name: city.name,
        }
    }
}

impl From<City> for proto::CityStream {
    fn from(city: City) -> Self {
        Self {
            city: Some(city.into()),
        }
    }
}

impl From<Vec<City>> for proto::Cities {
    fn from(cities: Vec<City>) -> Self {
        Self {
            city: cities.into_iter().map(Into::into).collect(),
        }
    }
}
