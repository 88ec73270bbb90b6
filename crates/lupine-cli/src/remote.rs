//! HTTP implementation of the fetch collaborator.

use std::io::{BufRead, BufReader};

use flate2::read::GzDecoder;

use lupine::{Error, MappingFetch, MappingVersion, Result};

/// Fetches the Yarn version listing and mapping payloads from the Fabric
/// infrastructure.
pub struct HttpFetch {
    meta_url: String,
    maven_url: String,
}

impl Default for HttpFetch {
    fn default() -> Self {
        HttpFetch {
            meta_url: "https://meta.fabricmc.net/v2/versions/yarn".to_string(),
            maven_url: "https://maven.fabricmc.net".to_string(),
        }
    }
}

impl MappingFetch for HttpFetch {
    fn versions(&self) -> Result<Vec<MappingVersion>> {
        let response = ureq::get(&self.meta_url).call().map_err(Error::fetch)?;
        serde_json::from_reader(response.into_reader()).map_err(Error::fetch)
    }

    fn mapping_lines(&self, version: &MappingVersion) -> Result<Vec<String>> {
        let url = format!(
            "{}/net/fabricmc/yarn/{v}/yarn-{v}-tiny.gz",
            self.maven_url,
            v = version.version
        );
        let response = ureq::get(&url).call().map_err(Error::fetch)?;

        let reader = BufReader::new(GzDecoder::new(response.into_reader()));
        let mut lines = reader.lines();

        // The first line of a Tiny v1 payload is the format header.
        if let Some(header) = lines.next() {
            header.map_err(Error::fetch)?;
        }

        lines
            .map(|line| line.map_err(Error::fetch))
            .collect::<Result<Vec<_>>>()
    }
}
