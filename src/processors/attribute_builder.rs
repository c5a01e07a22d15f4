use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::{
    AgentAffiliation, Attributes, ColumnDescriptor, ColumnType, CurrentDetails,
    DeviceFeed, Station, StationVariant,
};
use crate::settings::Settings;
use crate::utils::constants::*;
use crate::utils::naming::{qc_agg_name, qc_tests_name};

/// Derives CF/ACDD global attributes and per-variable descriptors from a resolved station.
pub struct AttributeBuilder<'a> {
    settings: &'a Settings,
}

impl<'a> AttributeBuilder<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// `base` holds caller-supplied global attributes; some of them take precedence.
    pub fn build(
        &self,
        station: &Station,
        base: Attributes,
    ) -> (Attributes, Vec<ColumnDescriptor>) {
        match &station.variant {
            StationVariant::Current(details) => {
                let columns = self.current_columns(station, details);
                let globals = self.current_globals(station, details, base, &columns);
                (globals, columns)
            }
            StationVariant::Legacy => {
                let columns = self.legacy_columns(station);
                let globals = self.legacy_globals(station, base, &columns);
                (globals, columns)
            }
        }
    }

    fn time_column(&self, station: &Station) -> ColumnDescriptor {
        let mut time = ColumnDescriptor::new("time", "time", ColumnType::Double);
        time.attributes
            .set("units", TIME_UNITS)
            .set("ioos_category", CATEGORY_TIME)
            .set("actual_range", vec![station.start_time, station.end_time]);
        time
    }

    fn position_column(&self, source: &str, name: &str, value: f64) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new(source, name, ColumnType::Double);
        column
            .attributes
            .set("ioos_category", CATEGORY_LOCATION)
            .set("actual_range", vec![value, value]);
        column
    }

    /// Attributes shared by a feed's value column in both API generations.
    fn feed_attributes(&self, station: &Station, feed: &DeviceFeed) -> Attributes {
        let sp = &feed.sensor_parameter;
        let missing = station.missing_value();
        let mut attrs = Attributes::new();
        attrs
            .set("standard_name", feed.standard_name())
            .set("long_name", feed.long_name())
            .set("units", sp.unit.symbol.as_str())
            .set("ioos_category", CATEGORY_OTHER)
            .set("urn", sp.parameter.urn.as_str())
            .set("missing_value", missing)
            .set("_FillValue", missing)
            .set_text("cell_methods", Some(sp.cell_methods.as_str()))
            .set_text("interval", Some(sp.interval.as_str()))
            .set_text("vertical_datum", Some(sp.vertical_datum.as_str()))
            .set_text("discriminant", Some(feed.discriminant.as_str()));
        attrs
    }

    fn current_columns(&self, station: &Station, details: &CurrentDetails) -> Vec<ColumnDescriptor> {
        let mut columns = Vec::with_capacity(5 + station.device_feeds.len() * 3);
        columns.push({
            let mut time = self.time_column(station);
            time.attributes.set("axis", "T");
            time
        });
        columns.push({
            let mut lat = self.position_column("lat", "latitude", station.latitude);
            lat.attributes.set("axis", "Y");
            lat
        });
        columns.push({
            let mut lon = self.position_column("lon", "longitude", station.longitude);
            lon.attributes.set("axis", "X");
            lon
        });

        let convention = station.vertical_convention();
        let mut z = ColumnDescriptor::new("z", "z", ColumnType::Double);
        z.attributes
            .set("axis", "Z")
            .set("ioos_category", CATEGORY_LOCATION)
            .set("units", "m")
            .set("positive", convention.positive())
            .set("actual_range", vec![station.min_z, station.max_z]);
        columns.push(z);

        let mut station_column = ColumnDescriptor::new("station", "station", ColumnType::String);
        station_column
            .attributes
            .set("ioos_code", self.settings.ioos_code(station.id))
            .set("ioos_category", CATEGORY_IDENTIFIER)
            .set("cf_role", "timeseries_id")
            .set("long_name", station.label.as_str())
            .set("short_name", station.urn.as_str())
            .set("type", details.platform_type.as_str());
        columns.push(station_column);

        let mut seen = HashSet::new();
        for feed in &station.device_feeds {
            let name = feed.canonical_name();
            if !seen.insert(name.clone()) {
                warn!(
                    "Station {} has more than one device feed named '{}' (feed {})",
                    station.id, name, feed.id
                );
            }

            let mut attrs = self.feed_attributes(station, feed);
            attrs
                .set("id", feed.id.to_string())
                .set("platform", "station");
            if details.submit_to_ndbc && is_gts_eligible(feed.standard_name()) {
                attrs.set("gts_ingest", "true");
            }

            let mut companions = Vec::new();
            if details.qc_enabled {
                let agg_name = qc_agg_name(&name);
                let tests_name = qc_tests_name(&name);
                attrs.set("ancillary_variables", format!("{} {}", agg_name, tests_name));
                companions.push(self.qc_agg_column(station, feed, &agg_name));
                companions.push(self.qc_tests_column(station, feed, &tests_name));
            }

            let mut value = ColumnDescriptor::new(&station.value_column(feed), &name, ColumnType::Double)
                .with_feed_id(feed.id);
            value.attributes = attrs;
            columns.push(value);
            columns.extend(companions);
        }

        debug!("Built {} column descriptors for station {}", columns.len(), station.id);
        columns
    }

    fn qc_agg_column(&self, station: &Station, feed: &DeviceFeed, name: &str) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new(&station.qc_agg_column(feed), name, ColumnType::Int)
            .with_feed_id(feed.id);
        column
            .attributes
            .set("standard_name", format!("{} status_flag", feed.standard_name()))
            .set("long_name", format!("{} QARTOD Aggregate Flag", feed.long_name()))
            .set("ioos_category", CATEGORY_OTHER)
            .set("flag_values", QC_FLAG_VALUES)
            .set("flag_meanings", QC_FLAG_MEANINGS)
            .set("missing_value", QC_FLAG_MISSING)
            .set("_FillValue", QC_FLAG_MISSING);
        column
    }

    fn qc_tests_column(&self, station: &Station, feed: &DeviceFeed, name: &str) -> ColumnDescriptor {
        let mut column =
            ColumnDescriptor::new(&station.qc_tests_column(feed), name, ColumnType::String)
                .with_feed_id(feed.id);
        column
            .attributes
            .set("standard_name", format!("{} status_flag", feed.standard_name()))
            .set("long_name", format!("{} QARTOD Individual Tests", feed.long_name()))
            .set("ioos_category", CATEGORY_OTHER)
            .set("flag_values", QC_FLAG_VALUES)
            .set("flag_meanings", QC_FLAG_MEANINGS)
            .set("comment", QC_TESTS_COMMENT)
            .set("missing_value", "")
            .set("_FillValue", "");
        column
    }

    fn legacy_columns(&self, station: &Station) -> Vec<ColumnDescriptor> {
        let mut columns = Vec::with_capacity(5 + station.device_feeds.len());
        columns.push(self.time_column(station));
        columns.push(self.position_column("latitude", "latitude", station.latitude));
        columns.push(self.position_column("longitude", "longitude", station.longitude));

        let mut station_column = ColumnDescriptor::new("station", "station", ColumnType::String);
        station_column
            .attributes
            .set("ioos_category", CATEGORY_IDENTIFIER)
            .set("cf_role", "timeseries_id");
        columns.push(station_column);

        // Legacy tables key value columns by name, so one descriptor per name
        let mut seen = HashSet::new();
        for feed in &station.device_feeds {
            let name = feed.canonical_name();
            if !seen.insert(name.clone()) {
                warn!(
                    "Device {} shares the variable name '{}' with another device at station {}; skipping its descriptor",
                    feed.id, name, station.id
                );
                continue;
            }
            let mut value = ColumnDescriptor::new(&name, &name, ColumnType::Double).with_feed_id(feed.id);
            value.attributes = self.feed_attributes(station, feed);
            columns.push(value);
        }

        let convention = station.vertical_convention();
        let mut depth = ColumnDescriptor::new("depth", "depth", ColumnType::Double);
        depth
            .attributes
            .set("ioos_category", CATEGORY_LOCATION)
            .set("units", "m")
            .set("positive", convention.positive())
            .set("actual_range", vec![station.min_z, station.max_z]);
        columns.push(depth);

        columns
    }

    fn timeseries_variables(columns: &[ColumnDescriptor]) -> String {
        columns
            .iter()
            .filter(|c| c.feed_id.is_some() && c.data_type == ColumnType::Double)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn set_geospatial(attrs: &mut Attributes, station: &Station) {
        attrs
            .set("geospatial_lon_min", station.longitude)
            .set("geospatial_lon_max", station.longitude)
            .set("geospatial_lat_min", station.latitude)
            .set("geospatial_lat_max", station.latitude);
    }

    fn set_party(attrs: &mut Attributes, prefix: &str, affiliation: &AgentAffiliation) {
        let agent = &affiliation.agent;
        attrs
            .set(&format!("{}_name", prefix), agent.label.as_str())
            .set(&format!("{}_institution", prefix), agent.label.as_str())
            .set_text(&format!("{}_email", prefix), agent.email.as_deref())
            .set_text(&format!("{}_country", prefix), agent.country.as_deref())
            .set(&format!("{}_sector", prefix), agent.sector_type.as_str())
            .set_text(&format!("{}_url", prefix), agent.url.as_deref())
            .set(&format!("{}_type", prefix), "institution");
    }

    fn current_globals(
        &self,
        station: &Station,
        details: &CurrentDetails,
        mut attrs: Attributes,
        columns: &[ColumnDescriptor],
    ) -> Attributes {
        let info_url = self.settings.info_url(station.id);

        attrs
            .set_if_absent("title", station.label.as_str())
            .set(
                "summary",
                format!("Timeseries data from '{}' ({})", station.label, station.urn),
            )
            .set("naming_authority", self.settings.naming_authority.as_str())
            .set("id", station.id)
            .set("platform", details.platform_type.as_str())
            .set("platform_vocabulary", PLATFORM_VOCABULARY)
            .set("featureType", "timeSeries")
            .set("Conventions", CONVENTIONS)
            .set("standard_name_vocabulary", STANDARD_NAME_VOCABULARY)
            .set("infoUrl", info_url.as_str())
            .set("info_url", info_url);

        Self::set_geospatial(&mut attrs, station);
        attrs
            .set("geospatial_lon_units", "degrees_east")
            .set("geospatial_lat_units", "degrees_north")
            .set("geospatial_vertical_min", station.min_z)
            .set("geospatial_vertical_max", station.max_z)
            .set("geospatial_vertical_units", "m")
            .set("geospatial_vertical_positive", station.vertical_convention().positive());

        attrs.set("institution", details.creator.agent.label.as_str());
        Self::set_party(&mut attrs, "creator", &details.creator);
        Self::set_party(&mut attrs, "publisher", &details.publisher);

        let processor = &self.settings.processor;
        let mut names: Vec<&str> = Vec::new();
        let mut roles: Vec<&str> = Vec::new();
        let mut urls: Vec<&str> = Vec::new();
        let mut emails: Vec<&str> = Vec::new();
        for contributor in &details.contributors {
            names.push(&contributor.agent.label);
            roles.push(&contributor.role);
            urls.push(contributor.agent.url.as_deref().unwrap_or(""));
            emails.push(contributor.agent.email.as_deref().unwrap_or(""));
        }
        names.push(&processor.name);
        roles.push(&processor.role);
        urls.push(&processor.url);
        emails.push(&processor.email);
        attrs
            .set("contributor_name", names.join(","))
            .set("contributor_role", roles.join(","))
            .set("contributor_url", urls.join(","))
            .set("contributor_email", emails.join(","))
            .set("contributor_role_vocabulary", ROLE_VOCABULARY);

        let references: Vec<&str> = [details.creator.foreign_url(), details.publisher.foreign_url()]
            .into_iter()
            .chain(details.contributors.iter().map(AgentAffiliation::foreign_url))
            .chain([details.qc_info_url.as_deref()])
            .flatten()
            .filter(|url| !url.is_empty())
            .collect();
        if !references.is_empty() {
            attrs.set("references", references.join(","));
        }

        let source_url = details
            .publisher
            .foreign_url()
            .or_else(|| details.creator.foreign_url());
        attrs.set_text("sourceUrl", source_url);

        let history = match details.publisher.foreign_url() {
            Some(url) => format!("Downloaded from {} at {}", details.publisher.agent.label, url),
            None => format!("Downloaded from {}", details.publisher.agent.label),
        };
        attrs.set("history", history);

        attrs.set_text("wmo_platform_code", details.wmo_id.as_deref());
        if details.submit_to_ndbc {
            attrs.set("gts_ingest", "true");
        }

        attrs
            .set("cdm_data_type", CDM_TIMESERIES)
            .set("cdm_timeseries_variables", Self::timeseries_variables(columns));
        attrs
    }

    fn legacy_globals(
        &self,
        station: &Station,
        mut attrs: Attributes,
        columns: &[ColumnDescriptor],
    ) -> Attributes {
        let legacy = &self.settings.legacy;
        attrs
            .set_if_absent("title", station.label.as_str())
            .set_if_absent(
                "summary",
                format!("Timeseries data from '{}' ({})", station.label, station.urn),
            )
            .set_if_absent("institution", legacy.institution.as_str())
            .set_if_absent("infoUrl", legacy.info_url.as_str())
            .set("sourceUrl", legacy.source_url.as_str())
            .set("cdm_data_type", CDM_TIMESERIES);
        Self::set_geospatial(&mut attrs, station);
        attrs.set("cdm_timeseries_variables", Self::timeseries_variables(columns));
        attrs
    }
}

/// Descriptor lookup by published name.
pub fn find_column<'c>(columns: &'c [ColumnDescriptor], name: &str) -> Option<&'c ColumnDescriptor> {
    columns.iter().find(|c| c.name == name)
}

/// Whether values with this standard name may be forwarded to the GTS via NDBC.
pub fn is_gts_eligible(standard_name: &str) -> bool {
    STANDARD_NAMES_TO_SUBMIT_TO_NDBC.contains(&standard_name)
}
