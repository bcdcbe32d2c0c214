use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/// Microsoft next CRL publish time (1.3.6.1.4.1.311.21.4).
///
/// Carried as UTCTime. GeneralizedTime is accepted and used for dates
/// UTCTime cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextCrlPublish {
    pub time: NaiveDateTime,
}

impl Extension for NextCrlPublish {
    const OID: &'static str = "1.3.6.1.4.1.311.21.4";
    const NAME: &'static str = "nextCRLPublish";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for NextCrlPublish {}

impl Decoder<Element, NextCrlPublish> for Element {
    type Error = Error;

    fn decode(&self) -> Result<NextCrlPublish> {
        match self {
            Element::UTCTime(time) | Element::GeneralizedTime(time) => {
                Ok(NextCrlPublish { time: *time })
            }
            _ => Err(Error::ExpectedTime(Kind::NextCrlPublish)),
        }
    }
}

impl EncodableTo<NextCrlPublish> for Element {}

impl Encoder<NextCrlPublish, Element> for NextCrlPublish {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        // RFC 5280 4.1.2.5: UTCTime through 2049.
        if (1950..2050).contains(&self.time.year()) {
            Ok(Element::UTCTime(self.time))
        } else {
            Ok(Element::GeneralizedTime(self.time))
        }
    }
}

impl fmt::Display for NextCrlPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%b %e %H:%M:%S %Y GMT"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn time(year: i32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_next_crl_publish_utc_time() {
        let mut der = vec![0x17, 0x0d];
        der.extend_from_slice(b"250301123000Z");
        let next = NextCrlPublish::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(time(2025), next.time);
        assert_eq!("Mar  1 12:30:00 2025 GMT", next.to_string());
        assert_eq!(der, next.to_value().unwrap());
    }

    #[test]
    fn test_next_crl_publish_after_2049() {
        let next = NextCrlPublish { time: time(2051) };
        let encoded: Element = next.encode().unwrap();
        assert_eq!(Element::GeneralizedTime(time(2051)), encoded);
    }

    #[test]
    fn test_next_crl_publish_not_time() {
        let result = NextCrlPublish::parse(&OctetString::from(vec![0x02, 0x01, 0x00]));
        assert_eq!(Err(Error::ExpectedTime(Kind::NextCrlPublish)), result);
    }
}
