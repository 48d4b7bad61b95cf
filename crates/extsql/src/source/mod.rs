//! Data sources: one configured external table bound to a plugin's dialect
//! and connection rules.

pub mod jdbc;
pub mod mysql;


use crate::Error;
use extsql_core::{
    config::{Properties, SourceConfig},
    expr::Filter,
    scan::{ConnectOptions, Driver, ScanRequest, Scanner},
    sql::{Dialect, Pushdown, QueryBuilder, SqlCompiler},
    wire::{WireNode, decode},
};
use tracing::{debug, info};

///
/// Plugin
///
/// Static description of one data source flavour.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Plugin {
    pub name: &'static str,
    pub dialect: Dialect,
    /// Connection properties added unless the URL already sets them.
    pub connect_defaults: &'static [(&'static str, &'static str)],
}

///
/// DataSource
///
/// One external table: where it lives and how to talk to it.
///

#[derive(Clone, Debug)]
pub struct DataSource {
    plugin: Plugin,
    config: SourceConfig,
}

impl DataSource {
    #[must_use]
    pub const fn new(plugin: Plugin, config: SourceConfig) -> Self {
        Self { plugin, config }
    }

    /// Build from host properties, reading the JSON `parameters` entry.
    pub fn from_properties(plugin: Plugin, properties: &Properties) -> Result<Self, Error> {
        let config = SourceConfig::from_properties(properties)?;
        info!(plugin = plugin.name, source = %config, "data source created");

        Ok(Self::new(plugin, config))
    }

    #[must_use]
    pub const fn plugin(&self) -> Plugin {
        self.plugin
    }

    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.plugin.dialect
    }

    /// Configuration with secrets masked.
    #[must_use]
    pub fn display_string(&self) -> String {
        self.config.display_string()
    }

    /// Compile each offered filter independently, in order.
    #[must_use]
    pub fn pushdown_filters(&self, filters: &[Filter]) -> Vec<Pushdown> {
        SqlCompiler::new(self.dialect()).compile_all(filters)
    }

    /// Decode a host node stream and answer with one string per filter:
    /// the fragment, or empty when the filter stays with the host.
    pub fn pushdown_wire(&self, nodes: &[WireNode]) -> Result<Vec<String>, Error> {
        let filters = decode(nodes)?;
        let answers: Vec<String> = self
            .pushdown_filters(&filters)
            .iter()
            .map(Pushdown::to_wire)
            .collect();

        debug!(
            plugin = self.plugin.name,
            offered = answers.len(),
            accepted = answers.iter().filter(|answer| !answer.is_empty()).count(),
            "pushdown answered"
        );

        Ok(answers)
    }

    /// Driver options: credentials plus every plugin default the URL does not
    /// already set.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = self.config.connect_options();

        for (key, value) in self.plugin.connect_defaults {
            if !options.url_mentions(key) {
                options = options.with_property(*key, *value);
            }
        }

        options
    }

    /// Apply the configured table to a host request.
    #[must_use]
    pub fn resolve_request(&self, mut request: ScanRequest) -> ScanRequest {
        if !self.config.table.is_empty() {
            request.table.clone_from(&self.config.table);
        }

        request
    }

    /// Open a scan of this source through `driver`.
    pub fn create_scanner<D: Driver>(
        &self,
        driver: &D,
        request: ScanRequest,
    ) -> Result<Scanner<D::Connection>, Error> {
        let request = self.resolve_request(request);
        let scanner = Scanner::open(
            driver,
            &self.connect_options(),
            QueryBuilder::new(self.dialect()),
            &request,
        )?;

        Ok(scanner)
    }
}
