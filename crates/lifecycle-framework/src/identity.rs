//! # Identity Resolution
//!
//! Resources are addressed by name, but callers may only know the long-form
//! ARN. [`Arn`] parses one into its parts and [`Addressing`] rebuilds it from
//! a name for output models. An [`ArnScope`] pins down which ARNs name a
//! resource of one type: anything from another service, resource type,
//! region or account is rejected rather than trimmed to its last segment.

use crate::error::IdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ambient addressing context for building ARNs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressing {
    pub partition: String,
    pub region: String,
    pub account: String,
}

impl Addressing {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account: account.into(),
        }
    }

    /// The ARN for `resource_type/name` in `service`.
    pub fn arn(&self, service: &str, resource_type: &str, name: &str) -> Arn {
        Arn {
            partition: self.partition.clone(),
            service: service.to_owned(),
            region: self.region.clone(),
            account: self.account.clone(),
            resource_type: resource_type.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn scope<'a>(&'a self, service: &'a str, resource_type: &'a str) -> ArnScope<'a> {
        ArnScope {
            addressing: self,
            service,
            resource_type,
        }
    }
}

/// The ARNs one resource type owns in the invocation's partition, region and
/// account.
#[derive(Debug, Clone, Copy)]
pub struct ArnScope<'a> {
    pub addressing: &'a Addressing,
    pub service: &'a str,
    pub resource_type: &'a str,
}

impl ArnScope<'_> {
    /// Parses `arn` and checks that it lies within this scope.
    pub fn parse(&self, arn: &str) -> Result<Arn, IdentityError> {
        let parsed: Arn = arn.parse()?;
        let expected = self
            .addressing
            .arn(self.service, self.resource_type, &parsed.name);
        if parsed != expected {
            return Err(IdentityError::ForeignArn {
                arn: arn.to_owned(),
                expected: self.prefix(),
            });
        }
        Ok(parsed)
    }

    fn prefix(&self) -> String {
        let Addressing {
            partition,
            region,
            account,
        } = self.addressing;
        format!(
            "arn:{partition}:{}:{region}:{account}:{}/",
            self.service, self.resource_type
        )
    }
}

/// `arn:{partition}:{service}:{region}:{account}:{resource_type}/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource_type: String,
    pub name: String,
}

impl FromStr for Arn {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IdentityError::MalformedArn(s.to_owned());
        let mut parts = s.splitn(6, ':');
        if parts.next() != Some("arn") {
            return Err(malformed());
        }
        let mut field = || parts.next().map(str::to_owned).ok_or_else(malformed);
        let partition = field()?;
        let service = field()?;
        let region = field()?;
        let account = field()?;
        let resource = field()?;

        let (resource_type, name) = resource.split_once('/').ok_or_else(malformed)?;
        if partition.is_empty() || service.is_empty() || resource_type.is_empty() || name.is_empty()
        {
            return Err(malformed());
        }
        Ok(Self {
            partition,
            service,
            region,
            account,
            resource_type: resource_type.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}/{}",
            self.partition, self.service, self.region, self.account, self.resource_type, self.name
        )
    }
}

/// Resolves a name from whichever identity fields are present.
///
/// The name wins when it is the only field; the ARN supplies it otherwise.
/// Both present and disagreeing is an error, and so is an ARN outside
/// `scope`.
pub fn resolve_name(
    name: Option<&str>,
    arn: Option<&str>,
    scope: ArnScope<'_>,
) -> Result<String, IdentityError> {
    match (name, arn) {
        (Some(name), None) => Ok(name.to_owned()),
        (None, Some(arn)) => Ok(scope.parse(arn)?.name),
        (Some(name), Some(arn)) => {
            let parsed = scope.parse(arn)?;
            if parsed.name == name {
                Ok(parsed.name)
            } else {
                Err(IdentityError::Mismatch {
                    name: name.to_owned(),
                    arn: arn.to_owned(),
                })
            }
        }
        (None, None) => Err(IdentityError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_rebuilds() {
        let text = "arn:aws:capacity:us-east-1:123456789012:pool/r1";
        let arn: Arn = text.parse().unwrap();
        assert_eq!(arn.name, "r1");
        assert_eq!(arn.resource_type, "pool");
        assert_eq!(arn.to_string(), text);

        let addressing = Addressing::new("aws", "us-east-1", "123456789012");
        assert_eq!(addressing.arn("capacity", "pool", "r1"), arn);
    }

    #[test]
    fn rejects_malformed_arns() {
        for bad in ["", "r1", "arn:aws:capacity", "arn:aws:capacity:r:a:pool", "arn:aws:capacity:r:a:pool/"] {
            assert!(matches!(
                bad.parse::<Arn>(),
                Err(IdentityError::MalformedArn(_))
            ), "{bad}");
        }
    }

    fn addressing() -> Addressing {
        Addressing::new("aws", "us-east-1", "123456789012")
    }

    #[test]
    fn resolves_name_from_either_field() {
        let addressing = addressing();
        let scope = addressing.scope("capacity", "pool");
        let arn = "arn:aws:capacity:us-east-1:123456789012:pool/r1";
        assert_eq!(resolve_name(Some("r1"), None, scope).unwrap(), "r1");
        assert_eq!(resolve_name(None, Some(arn), scope).unwrap(), "r1");
        assert_eq!(resolve_name(Some("r1"), Some(arn), scope).unwrap(), "r1");
        assert!(matches!(
            resolve_name(Some("r2"), Some(arn), scope),
            Err(IdentityError::Mismatch { .. })
        ));
        assert_eq!(resolve_name(None, None, scope), Err(IdentityError::Missing));
    }

    #[test]
    fn rejects_arns_outside_the_scope() {
        let addressing = addressing();
        let scope = addressing.scope("capacity", "pool");
        for foreign in [
            "arn:aws:iam::999999999999:role/r1",
            "arn:aws:compute:us-east-1:123456789012:pool/r1",
            "arn:aws:capacity:us-east-1:123456789012:reservation/r1",
            "arn:aws:capacity:eu-west-1:123456789012:pool/r1",
            "arn:aws:capacity:us-east-1:999999999999:pool/r1",
            "arn:aws-cn:capacity:us-east-1:123456789012:pool/r1",
        ] {
            assert_eq!(
                resolve_name(None, Some(foreign), scope),
                Err(IdentityError::ForeignArn {
                    arn: foreign.to_owned(),
                    expected: "arn:aws:capacity:us-east-1:123456789012:pool/".to_owned(),
                }),
                "{foreign}"
            );
        }
    }
}
