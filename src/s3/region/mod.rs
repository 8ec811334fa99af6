use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

// https://docs.aws.amazon.com/general/latest/gr/rande.html#regional-endpoints
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    AfSouth1,
    ApEast1,
    ApNortheast1,
    ApNortheast2,
    ApNortheast3,
    ApSouth1,
    ApSoutheast1,
    ApSoutheast2,
    CaCentral1,
    CnNorth1,
    CnNorthwest1,
    EuCentral1,
    EuNorth1,
    EuSouth1,
    EuWest1,
    EuWest2,
    EuWest3,
    MeSouth1,
    SaEast1,
    UsEast1,
    UsEast2,
    UsWest1,
    UsWest2,

    // any S3 compatible service (MinIO, Ceph, Backblaze ...), endpoint may carry the scheme
    Custom { name: String, endpoint: String },
}

const AWS_REGIONS: &[(&str, Region)] = &[
    ("af-south-1", Region::AfSouth1),
    ("ap-east-1", Region::ApEast1),
    ("ap-northeast-1", Region::ApNortheast1),
    ("ap-northeast-2", Region::ApNortheast2),
    ("ap-northeast-3", Region::ApNortheast3),
    ("ap-south-1", Region::ApSouth1),
    ("ap-southeast-1", Region::ApSoutheast1),
    ("ap-southeast-2", Region::ApSoutheast2),
    ("ca-central-1", Region::CaCentral1),
    ("cn-north-1", Region::CnNorth1),
    ("cn-northwest-1", Region::CnNorthwest1),
    ("eu-central-1", Region::EuCentral1),
    ("eu-north-1", Region::EuNorth1),
    ("eu-south-1", Region::EuSouth1),
    ("eu-west-1", Region::EuWest1),
    ("eu-west-2", Region::EuWest2),
    ("eu-west-3", Region::EuWest3),
    ("me-south-1", Region::MeSouth1),
    ("sa-east-1", Region::SaEast1),
    ("us-east-1", Region::UsEast1),
    ("us-east-2", Region::UsEast2),
    ("us-west-1", Region::UsWest1),
    ("us-west-2", Region::UsWest2),
];

impl Region {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Custom { name, .. } => name,
            region => AWS_REGIONS
                .iter()
                .find(|(_, r)| r == region)
                .map_or("us-east-1", |(name, _)| name),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        match self {
            Self::Custom { endpoint, .. } => endpoint.clone(),
            Self::CnNorth1 | Self::CnNorthwest1 => {
                format!("s3.{}.amazonaws.com.cn", self.name())
            }
            _ => format!("s3.{}.amazonaws.com", self.name()),
        }
    }
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.to_lowercase();
        AWS_REGIONS
            .iter()
            .find(|(name, _)| *name == v)
            .map(|(_, region)| region.clone())
            .ok_or_else(|| ParseRegionError::new(s))
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An error produced when attempting to convert a `str` into a `Region` fails.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseRegionError {
    message: String,
}

impl ParseRegionError {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            message: format!("Not a valid AWS region: {input}"),
        }
    }
}

impl Error for ParseRegionError {}

impl Display for ParseRegionError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Default for Region {
    fn default() -> Self {
        match std::env::var("AWS_DEFAULT_REGION").or_else(|_| std::env::var("AWS_REGION")) {
            Ok(ref v) => Self::from_str(v).unwrap_or(Self::UsEast1),
            Err(_) => Self::UsEast1,
        }
    }
}
