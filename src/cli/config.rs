use crate::s3::Region;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{collections::BTreeMap, fs::File, path::Path};

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct Config {
    pub hosts: BTreeMap<String, Host>,
}

#[derive(Deserialize, Eq, PartialEq)]
pub struct Host {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
}

// keeps the secret out of the logs
impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// # Errors
    ///
    /// Will return `Err` if the file can not be read or parsed
    pub fn new(config_path: &Path) -> Result<Self> {
        let file = File::open(config_path)
            .with_context(|| format!("unable to open: {}", config_path.display()))?;

        let config: Self =
            serde_yaml_ng::from_reader(file).context("unable to parse config file")?;

        Ok(config)
    }

    /// Get the host from the config.yml
    ///
    /// # Errors
    ///
    /// Will return `Err` if the host is not defined
    pub fn get_host(&self, name: &str) -> Result<&Host> {
        self.hosts
            .get(name)
            .with_context(|| format!("could not find host {name}"))
    }
}

impl Host {
    /// An endpoint makes it a custom region, the region name (default `us-east-1`) is then
    /// only used to sign
    ///
    /// # Errors
    ///
    /// Will return `Err` if there is no endpoint and the region is not a known AWS region
    pub fn get_region(&self) -> Result<Region> {
        match (&self.endpoint, &self.region) {
            (Some(endpoint), region) => Ok(Region::Custom {
                name: region.clone().unwrap_or_else(|| String::from("us-east-1")),
                endpoint: endpoint.clone(),
            }),
            (None, Some(region)) => Ok(region.parse::<Region>()?),
            (None, None) => Err(anyhow!("could not parse host need an endpoint or region")),
        }
    }
}
