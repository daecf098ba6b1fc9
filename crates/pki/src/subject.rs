//! Distinguished names for the root and leaf certificates.

use const_oid::db::rfc4519::{COMMON_NAME, COUNTRY_NAME, ORGANIZATION_NAME, SERIAL_NUMBER};
use const_oid::ObjectIdentifier;
use der::asn1::{PrintableStringRef, SetOfVec, Utf8StringRef};
use der::Any;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use crate::error::{PkiError, PkiResult};

pub const DEFAULT_ORGANIZATION: &str = "Verifiable SN";
pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_COMMON_NAME: &str = "Verifiable SN CA";

/// Subject template shared by the root and every leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaSubject {
    pub organization: String,
    pub country: String,
    pub common_name: String,
}

impl Default for CaSubject {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            common_name: DEFAULT_COMMON_NAME.to_string(),
        }
    }
}

impl CaSubject {
    pub fn new(
        organization: impl Into<String>,
        country: impl Into<String>,
        common_name: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            country: country.into(),
            common_name: common_name.into(),
        }
    }

    /// Root subject (also the issuer of every leaf): `C, O, CN`.
    pub(crate) fn root_name(&self) -> PkiResult<Name> {
        build_name(&[
            (COUNTRY_NAME, Value::Printable(&self.country)),
            (ORGANIZATION_NAME, Value::Utf8(&self.organization)),
            (COMMON_NAME, Value::Utf8(&self.common_name)),
        ])
    }

    /// Leaf subject: `C, O`, then the user id as both `CN` and `serialNumber`.
    pub(crate) fn leaf_name(&self, user_id: &Uuid) -> PkiResult<Name> {
        let user = user_id.hyphenated().to_string();
        build_name(&[
            (COUNTRY_NAME, Value::Printable(&self.country)),
            (ORGANIZATION_NAME, Value::Utf8(&self.organization)),
            (COMMON_NAME, Value::Utf8(&user)),
            (SERIAL_NUMBER, Value::Printable(&user)),
        ])
    }
}

enum Value<'a> {
    Printable(&'a str),
    Utf8(&'a str),
}

impl Value<'_> {
    fn to_any(&self) -> der::Result<Any> {
        match self {
            Value::Printable(s) => Any::encode_from(&PrintableStringRef::new(s)?),
            Value::Utf8(s) => Any::encode_from(&Utf8StringRef::new(s)?),
        }
    }
}

fn build_name(attributes: &[(ObjectIdentifier, Value<'_>)]) -> PkiResult<Name> {
    let mut rdns = Vec::with_capacity(attributes.len());

    for (oid, value) in attributes {
        let atv = AttributeTypeAndValue {
            oid: *oid,
            value: value
                .to_any()
                .map_err(|e| PkiError::Signing(format!("invalid name attribute {}: {}", oid, e)))?,
        };
        let set = SetOfVec::try_from(vec![atv])
            .map_err(|e| PkiError::Signing(format!("invalid name attribute {}: {}", oid, e)))?;
        rdns.push(RelativeDistinguishedName(set));
    }

    Ok(RdnSequence(rdns))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(name: &Name, oid: ObjectIdentifier) -> Vec<String> {
        name.0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .filter(|atv| atv.oid == oid)
            .map(|atv| String::from_utf8(atv.value.value().to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_root_name_renders_template() {
        let name = CaSubject::default().root_name().unwrap();

        assert_eq!(name.0.len(), 3);
        assert_eq!(attribute(&name, COUNTRY_NAME), vec!["US"]);
        assert_eq!(attribute(&name, ORGANIZATION_NAME), vec!["Verifiable SN"]);
        assert_eq!(attribute(&name, COMMON_NAME), vec!["Verifiable SN CA"]);
    }

    #[test]
    fn test_leaf_name_carries_user_id_twice() {
        let user = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
        let name = CaSubject::default().leaf_name(&user).unwrap();

        assert_eq!(
            attribute(&name, COMMON_NAME),
            vec!["3fa85f64-5717-4562-b3fc-2c963f66afa6"]
        );
        assert_eq!(
            attribute(&name, SERIAL_NUMBER),
            vec!["3fa85f64-5717-4562-b3fc-2c963f66afa6"]
        );
        assert_eq!(attribute(&name, ORGANIZATION_NAME), vec!["Verifiable SN"]);
    }

    #[test]
    fn test_leaf_issuer_differs_from_leaf_subject() {
        let subject = CaSubject::default();
        let user = Uuid::new_v4();
        assert_ne!(subject.root_name().unwrap(), subject.leaf_name(&user).unwrap());
    }

    #[test]
    fn test_country_must_be_printable() {
        let subject = CaSubject::new("Org", "U@S", "CA");
        assert!(matches!(subject.root_name(), Err(PkiError::Signing(_))));
    }
}
